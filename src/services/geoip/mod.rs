//! GeoIP 服务模块
//!
//! 将用户的 IP 来源解析为省级地区，支持：
//! - 文本形式的 IP 来源（登录时记录）
//! - MaxMind GeoLite2 本地数据库（原始 IP）

mod ip_source;
mod maxmind;
mod provider;

pub use ip_source::parse_ip_source;
pub use maxmind::MaxMindRegionLookup;
pub use provider::{RegionLookup, RegionResolver};
