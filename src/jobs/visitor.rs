//! 访客统计任务
//!
//! - 保存昨日独立访客数
//! - 统计用户地域分布
//! - 清空访客缓存（必须在前两者之后执行）

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::{JobOutcome, JobRunner, UserArea, VisitorSnapshot};
use crate::errors::{BlogkeeperError, Result};
use crate::storage::UniqueView;

/// 无法识别的地区
pub const UNKNOWN_REGION: &str = "unknown";

impl JobRunner {
    pub async fn save_unique_view(&self) -> Result<JobOutcome> {
        self.save_unique_view_at(Utc::now()).await
    }

    /// 以 `now` 为调用时刻保存快照，快照时间为 `now - 1 天`
    pub async fn save_unique_view_at(&self, now: DateTime<Utc>) -> Result<JobOutcome> {
        let key = &self.settings.keys.unique_visitor;

        // 缓存不可达时直接返回错误，不写入任何记录
        let snapshot = match self.collaborators.cache.set_cardinality(key).await? {
            Some(n) => VisitorSnapshot::Present(n),
            None => {
                warn!(
                    "Unique visitor set '{}' is absent, saving 0 for yesterday",
                    key
                );
                VisitorSnapshot::Absent
            }
        };

        let views_count = i32::try_from(snapshot.count()).map_err(|_| {
            BlogkeeperError::validation(format!(
                "unique visitor count {} does not fit the views_count column",
                snapshot.count()
            ))
        })?;

        let view = UniqueView {
            create_time: now - Duration::days(1),
            views_count,
        };
        self.collaborators.visitors.insert_unique_view(&view).await?;

        info!(
            "Saved {} unique visitors for {}",
            views_count,
            view.create_time.date_naive()
        );
        Ok(JobOutcome::UniqueViewSaved {
            snapshot,
            create_time: view.create_time,
        })
    }

    /// 删除独立访客集合与游客地域统计，重复执行无副作用
    pub async fn clear_visitor_cache(&self) -> Result<JobOutcome> {
        let keys = [
            &self.settings.keys.unique_visitor,
            &self.settings.keys.visitor_area,
        ];

        let mut keys_deleted = 0;
        for key in keys {
            if self.collaborators.cache.delete(key).await? {
                keys_deleted += 1;
            } else {
                debug!("Cache key '{}' already absent", key);
            }
        }

        info!("Cleared visitor cache ({} keys existed)", keys_deleted);
        Ok(JobOutcome::VisitorCacheCleared { keys_deleted })
    }

    /// 统计用户地域分布并覆盖缓存
    ///
    /// 只读取 IP 来源一列，按主键分页扫描
    pub async fn statistical_user_area(&self) -> Result<JobOutcome> {
        let page_size = self.settings.scan_page_size;
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut users = 0u64;
        let mut after_id = 0;

        loop {
            let page = self
                .collaborators
                .visitors
                .ip_source_page(after_id, page_size)
                .await?;
            let Some(&(last_id, _)) = page.last() else {
                break;
            };

            for (_, source) in &page {
                let region = self.resolve_region(source.as_deref()).await;
                *counts.entry(region).or_insert(0) += 1;
            }

            users += page.len() as u64;
            after_id = last_id;
            debug!("Scanned {} users (last id {})", users, last_id);

            if (page.len() as u64) < page_size {
                break;
            }
        }

        let regions = sorted_areas(counts);
        let payload = serde_json::to_string(&regions)?;
        self.collaborators
            .cache
            .set_string(&self.settings.keys.user_area, &payload)
            .await?;

        info!(
            "User area statistics: {} users across {} regions",
            users,
            regions.len()
        );
        Ok(JobOutcome::UserAreaComputed { users, regions })
    }

    async fn resolve_region(&self, source: Option<&str>) -> String {
        match source.map(str::trim).filter(|s| !s.is_empty()) {
            Some(source) => self
                .collaborators
                .regions
                .lookup(source)
                .await
                .unwrap_or_else(|| UNKNOWN_REGION.to_string()),
            None => UNKNOWN_REGION.to_string(),
        }
    }
}

/// 按人数降序、名称升序排列，保证输出稳定
fn sorted_areas(counts: HashMap<String, u64>) -> Vec<UserArea> {
    let mut areas: Vec<UserArea> = counts
        .into_iter()
        .map(|(name, value)| UserArea { name, value })
        .collect();
    areas.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    areas
}
