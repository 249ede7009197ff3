use std::sync::Arc;

use tracing::info;

use crate::config::CacheConfig;
use crate::errors::{BlogkeeperError, Result};

pub mod kv;
pub mod traits;

pub use kv::{MemoryKvCache, RedisKvCache};
pub use traits::KvCache;

/// 根据 `cache.type` 创建缓存客户端
pub fn create_cache(config: &CacheConfig) -> Result<Arc<dyn KvCache>> {
    let cache: Arc<dyn KvCache> = match config.cache_type.as_str() {
        "redis" => Arc::new(RedisKvCache::new(config)?),
        "memory" => Arc::new(MemoryKvCache::new()),
        other => {
            return Err(BlogkeeperError::config(format!(
                "Unknown cache type '{}', expected 'redis' or 'memory'",
                other
            )));
        }
    };
    info!("Cache backend: {}", config.cache_type);
    Ok(cache)
}
