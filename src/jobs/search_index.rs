use tracing::{debug, info, warn};

use super::{IndexRebuildReport, JobRunner};
use crate::errors::{BlogkeeperError, Result};
use crate::search::ArticleSearchDto;

impl JobRunner {
    /// 清空索引后按批次重新写入全部文章
    ///
    /// 任一批次失败即中止，此时索引只包含部分文章，重新执行即可恢复
    pub async fn rebuild_search_index(&self) -> Result<IndexRebuildReport> {
        let search = &self.collaborators.search;
        let batch_size = self.settings.index_batch_size;

        let deleted = search.delete_all().await?;
        info!("Search index cleared ({} documents deleted)", deleted);

        let mut indexed = 0u64;
        let mut after_id = 0;
        loop {
            let page = self
                .collaborators
                .articles
                .article_page(after_id, batch_size)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            after_id = last.id;
            let fetched = page.len() as u64;

            let docs: Vec<ArticleSearchDto> =
                page.into_iter().map(ArticleSearchDto::from).collect();
            if let Err(e) = search.save_batch(&docs).await {
                warn!(
                    "Search index rebuild aborted after {} documents: {}",
                    indexed, e
                );
                return Err(e);
            }
            indexed += fetched;
            debug!("Indexed {} documents (last id {})", indexed, after_id);

            if fetched < batch_size {
                break;
            }
        }

        let count = search.count().await?;
        if count != indexed {
            return Err(BlogkeeperError::search_index(format!(
                "index holds {} documents after rebuild, expected {}",
                count, indexed
            )));
        }

        info!("Search index rebuilt with {} documents", indexed);
        Ok(IndexRebuildReport { deleted, indexed })
    }
}
