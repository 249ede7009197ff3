use async_trait::async_trait;

use crate::errors::Result;

/// 键值缓存客户端
///
/// 只覆盖维护任务用到的操作：集合基数、字符串读写与删除。
/// 所有方法在缓存不可达时返回错误，调用方据此中止任务。
#[async_trait]
pub trait KvCache: Send + Sync {
    /// 集合元素个数
    ///
    /// - `Ok(None)` 表示键不存在
    /// - `Ok(Some(0))` 表示键存在但集合为空
    async fn set_cardinality(&self, key: &str) -> Result<Option<u64>>;

    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// 覆盖写入，不设置过期时间
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// 删除键，返回键是否存在；删除不存在的键不是错误
    async fn delete(&self, key: &str) -> Result<bool>;
}
