//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 MaxMind GeoLite2-City.mmdb 文件将原始 IP 解析为省级地区

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::RegionLookup;

pub struct MaxMindRegionLookup {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindRegionLookup {
    /// 从文件路径加载数据库
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl RegionLookup for MaxMindRegionLookup {
    async fn lookup(&self, source: &str) -> Option<String> {
        let ip_addr: IpAddr = source.trim().parse().ok()?;

        let result = self.reader.lookup(ip_addr).ok()?;
        let city: maxminddb::geoip2::City = result.decode().ok()??;

        // 优先一级行政区，其次国家；中文名优先
        let region = city
            .subdivisions
            .first()
            .and_then(|s| s.names.simplified_chinese.or(s.names.english))
            .or(city
                .country
                .names
                .simplified_chinese
                .or(city.country.names.english))
            .map(String::from);

        trace!("MaxMind lookup for {}: region={:?}", source, region);
        region
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
