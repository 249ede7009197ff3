use async_trait::async_trait;

use super::ArticleSearchDto;
use crate::errors::Result;

/// 文章搜索索引客户端
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// 删除索引中的全部文档，返回删除数量；索引不存在时返回 0
    async fn delete_all(&self) -> Result<u64>;

    async fn save(&self, doc: &ArticleSearchDto) -> Result<()>;

    /// 批量写入，任何一条失败都视为整批失败
    async fn save_batch(&self, docs: &[ArticleSearchDto]) -> Result<usize>;

    async fn count(&self) -> Result<u64>;
}
