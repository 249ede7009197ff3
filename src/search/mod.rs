//! 文章搜索索引
//!
//! 任务只依赖 `SearchIndex` trait；实现由 `search.backend` 选择。

use std::sync::Arc;

use tracing::info;

use crate::config::SearchConfig;
use crate::errors::{BlogkeeperError, Result};

mod document;
mod elasticsearch;
mod memory;
mod traits;

pub use document::ArticleSearchDto;
pub use elasticsearch::ElasticsearchIndex;
pub use memory::MemorySearchIndex;
pub use traits::SearchIndex;

pub fn create_search_index(config: &SearchConfig) -> Result<Arc<dyn SearchIndex>> {
    let index: Arc<dyn SearchIndex> = match config.backend.as_str() {
        "elasticsearch" => Arc::new(ElasticsearchIndex::new(config)?),
        "memory" => Arc::new(MemorySearchIndex::new()),
        other => {
            return Err(BlogkeeperError::config(format!(
                "Unknown search backend '{}', expected 'elasticsearch' or 'memory'",
                other
            )));
        }
    };
    info!("Search backend: {} (index '{}')", config.backend, config.index);
    Ok(index)
}
