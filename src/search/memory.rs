use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ArticleSearchDto, SearchIndex};
use crate::errors::Result;

/// 进程内搜索索引，按文章 ID 存放文档
#[derive(Default, Clone)]
pub struct MemorySearchIndex {
    docs: Arc<RwLock<BTreeMap<i32, ArticleSearchDto>>>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i32) -> Option<ArticleSearchDto> {
        self.docs.read().get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<i32> {
        self.docs.read().keys().copied().collect()
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn delete_all(&self) -> Result<u64> {
        let mut docs = self.docs.write();
        let deleted = docs.len() as u64;
        docs.clear();
        Ok(deleted)
    }

    async fn save(&self, doc: &ArticleSearchDto) -> Result<()> {
        self.docs.write().insert(doc.id, doc.clone());
        Ok(())
    }

    async fn save_batch(&self, batch: &[ArticleSearchDto]) -> Result<usize> {
        let mut docs = self.docs.write();
        for doc in batch {
            docs.insert(doc.id, doc.clone());
        }
        Ok(batch.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.docs.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i32) -> ArticleSearchDto {
        ArticleSearchDto {
            id,
            article_title: format!("t{}", id),
            article_content: String::new(),
            is_delete: 0,
            status: 1,
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_by_id() {
        let index = MemorySearchIndex::new();
        index.save_batch(&[doc(1), doc(2)]).await.unwrap();
        let mut updated = doc(1);
        updated.article_title = "renamed".to_string();
        index.save(&updated).await.unwrap();

        assert_eq!(index.count().await.unwrap(), 2);
        assert_eq!(index.get(1).unwrap().article_title, "renamed");
        assert_eq!(index.delete_all().await.unwrap(), 2);
        assert_eq!(index.count().await.unwrap(), 0);
    }
}
