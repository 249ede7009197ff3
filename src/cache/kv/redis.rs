use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::cache::KvCache;
use crate::config::CacheConfig;
use crate::errors::{BlogkeeperError, Result};

pub struct RedisKvCache {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
    timeout: Duration,
}

impl RedisKvCache {
    /// 创建客户端；连接在第一次命令时建立
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let redis_config = &config.redis;
        let client = redis::Client::open(redis_config.url.as_str()).map_err(|e| {
            BlogkeeperError::cache_connection(format!(
                "Invalid Redis URL '{}': {}",
                redis_config.url, e
            ))
        })?;

        debug!(
            "RedisKvCache created with prefix: '{}', timeout: {}ms",
            redis_config.key_prefix, config.timeout_ms
        );

        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: redis_config.key_prefix.clone(),
            timeout: Duration::from_millis(config.timeout_ms.max(1)),
        })
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> redis::RedisResult<MultiplexedConnection> {
        // 首先尝试读取现有连接
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self.client.get_multiplexed_async_connection().await?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// 在超时内执行一条命令；连接类错误会丢弃缓存的连接
    async fn execute<T, F, Fut>(&self, op: &str, command: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: std::future::Future<Output = redis::RedisResult<T>>,
    {
        let outcome = tokio::time::timeout(self.timeout, async {
            let conn = self.get_connection().await?;
            command(conn).await
        })
        .await;

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                let err = BlogkeeperError::from(e);
                if err.is_unavailable() {
                    self.reset_connection().await;
                }
                Err(err)
            }
            Err(_) => {
                self.reset_connection().await;
                Err(BlogkeeperError::timeout(format!(
                    "Redis {} timed out after {:?}",
                    op, self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl KvCache for RedisKvCache {
    async fn set_cardinality(&self, key: &str) -> Result<Option<u64>> {
        let redis_key = self.make_key(key);
        let (exists, size): (bool, u64) = self
            .execute("SCARD", |mut conn| async move {
                // EXISTS 与 SCARD 放在同一个 MULTI 中，保证读到的是同一时刻的状态
                redis::pipe()
                    .atomic()
                    .exists(&redis_key)
                    .scard(&redis_key)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        trace!("SCARD {} -> exists={}, size={}", key, exists, size);
        Ok(exists.then_some(size))
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.make_key(key);
        self.execute("GET", |mut conn| async move {
            conn.get::<_, Option<String>>(redis_key).await
        })
        .await
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let redis_key = self.make_key(key);
        let value = value.to_string();
        self.execute("SET", |mut conn| async move {
            conn.set::<_, _, ()>(redis_key, value).await
        })
        .await?;
        trace!("SET {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let redis_key = self.make_key(key);
        let deleted: i64 = self
            .execute("DEL", |mut conn| async move { conn.del(redis_key).await })
            .await?;
        trace!("DEL {} -> {}", key, deleted);
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_connection_error() {
        let mut config = CacheConfig::default();
        config.redis.url = "not a url".to_string();
        let err = RedisKvCache::new(&config).err().unwrap();
        assert!(matches!(err, BlogkeeperError::CacheConnection(_)));
    }

    #[test]
    fn test_key_prefix() {
        let mut config = CacheConfig::default();
        config.redis.url = "redis://127.0.0.1:6379/".to_string();
        config.redis.key_prefix = "blog:".to_string();
        let cache = RedisKvCache::new(&config).unwrap();
        assert_eq!(cache.make_key("unique_visitor"), "blog:unique_visitor");
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_loudly() {
        let mut config = CacheConfig::default();
        // 保留端口，不会有 Redis 在监听
        config.redis.url = "redis://127.0.0.1:1/".to_string();
        config.timeout_ms = 500;
        let cache = RedisKvCache::new(&config).unwrap();

        let err = cache.set_cardinality("unique_visitor").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
