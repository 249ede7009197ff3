use futures_util::{StreamExt, stream};
use tracing::{info, warn};

use super::{JobRunner, SeoFailure, SeoReport};
use crate::errors::Result;
use crate::utils::article_url;

impl JobRunner {
    /// 推送全部文章链接
    ///
    /// 单篇失败不影响其他文章；只有读取文章列表失败才算任务失败
    pub async fn seo_push(&self) -> Result<SeoReport> {
        let ids = self.collaborators.articles.list_article_ids().await?;
        let notifier = &self.collaborators.seo;
        let base = self.settings.website_url.as_str();

        let results: Vec<(i32, Result<()>)> = stream::iter(ids.iter().copied())
            .map(|id| async move {
                let url = article_url(base, id);
                (id, notifier.notify(&url).await)
            })
            .buffer_unordered(self.settings.seo_concurrency.max(1))
            .collect()
            .await;

        let mut report = SeoReport {
            attempted: results.len(),
            ..SeoReport::default()
        };
        for (id, result) in results {
            match result {
                Ok(()) => report.succeeded.push(id),
                Err(e) => {
                    warn!("SEO push for article {} failed: {}", id, e);
                    report.failed.push(SeoFailure {
                        article_id: id,
                        reason: e.format_simple(),
                    });
                }
            }
        }
        report.succeeded.sort_unstable();
        report.failed.sort_by_key(|f| f.article_id);

        info!(
            "SEO push: {} attempted, {} succeeded, {} failed",
            report.attempted,
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }
}
