//! 地区解析抽象层
//!
//! `RegionResolver` 组合两种实现：
//! 1. 文本形式的 IP 来源直接解析
//! 2. 原始 IP 地址交给 MaxMind（配置了 maxminddb_path 且文件可读时）
//!
//! 结果带 moka 缓存，相同来源只解析一次。

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, info, trace, warn};

use super::ip_source::parse_ip_source;
use super::maxmind::MaxMindRegionLookup;
use crate::config::GeoIpConfig;

/// 解析缓存 TTL（30 分钟）
const REGION_CACHE_TTL_SECS: u64 = 30 * 60;
/// 解析缓存最大容量
const REGION_CACHE_MAX_CAPACITY: u64 = 10_000;

/// 地区解析 trait
#[async_trait]
pub trait RegionLookup: Send + Sync {
    /// 将 IP 来源解析为省级地区名，无法识别返回 None
    async fn lookup(&self, source: &str) -> Option<String>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一地区解析器
#[derive(Clone)]
pub struct RegionResolver {
    maxmind: Option<Arc<dyn RegionLookup>>,
    /// 来源 → 地区缓存（Option 用于负缓存）
    cache: Cache<String, Option<String>>,
}

impl RegionResolver {
    /// 根据 GeoIpConfig 初始化
    ///
    /// MaxMind 数据库加载失败不是致命错误，原始 IP 将被视为无法识别
    pub fn new(config: &GeoIpConfig) -> Self {
        let maxmind: Option<Arc<dyn RegionLookup>> = match config.maxminddb_path {
            Some(ref path) => match MaxMindRegionLookup::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Some(Arc::new(provider))
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, raw IPs will resolve to unknown",
                        path, e
                    );
                    None
                }
            },
            None => {
                debug!("GeoIP: No MaxMind database configured, text sources only");
                None
            }
        };

        Self::with_ip_lookup(maxmind)
    }

    /// 指定原始 IP 的解析实现
    pub fn with_ip_lookup(maxmind: Option<Arc<dyn RegionLookup>>) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(REGION_CACHE_TTL_SECS))
            .max_capacity(REGION_CACHE_MAX_CAPACITY)
            .build();
        Self { maxmind, cache }
    }

    async fn resolve_uncached(&self, source: &str) -> Option<String> {
        if source.parse::<IpAddr>().is_ok() {
            return match self.maxmind {
                Some(ref lookup) => lookup.lookup(source).await,
                None => None,
            };
        }
        parse_ip_source(source)
    }
}

#[async_trait]
impl RegionLookup for RegionResolver {
    async fn lookup(&self, source: &str) -> Option<String> {
        let key = source.trim().to_string();
        if key.is_empty() {
            return None;
        }

        // get_with 自带 singleflight 语义
        self.cache
            .get_with(key.clone(), async {
                trace!("Region cache miss for {}", key);
                self.resolve_uncached(&key).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        match self.maxmind {
            Some(_) => "Text+MaxMind",
            None => "Text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingIpLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegionLookup for CountingIpLookup {
        async fn lookup(&self, _source: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some("广东省".to_string())
        }

        fn name(&self) -> &'static str {
            "Counting"
        }
    }

    #[tokio::test]
    async fn test_text_source_without_maxmind() {
        let resolver = RegionResolver::new(&GeoIpConfig::default());
        assert_eq!(
            resolver.lookup("中国|广东省|深圳市|电信").await.as_deref(),
            Some("广东省")
        );
        assert_eq!(resolver.lookup("  ").await, None);
        // 没有数据库时原始 IP 无法识别
        assert_eq!(resolver.lookup("8.8.8.8").await, None);
        assert_eq!(resolver.name(), "Text");
    }

    #[tokio::test]
    async fn test_raw_ip_goes_to_ip_lookup_once() {
        let counting = Arc::new(CountingIpLookup {
            calls: AtomicUsize::new(0),
        });
        let resolver = RegionResolver::with_ip_lookup(Some(counting.clone()));

        for _ in 0..3 {
            assert_eq!(
                resolver.lookup("113.88.1.1").await.as_deref(),
                Some("广东省")
            );
        }
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

        // 文本来源不经过 IP 解析
        resolver.lookup("北京市 联通").await;
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_database_file_is_not_fatal() {
        let config = GeoIpConfig {
            maxminddb_path: Some("/nonexistent/GeoLite2-City.mmdb".to_string()),
        };
        let resolver = RegionResolver::new(&config);
        assert_eq!(resolver.name(), "Text");
    }
}
