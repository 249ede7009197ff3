//! 任务日志服务
//!
//! 记录每次任务执行，并负责日志保留策略。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::JobLogConfig;
use crate::errors::Result;
use crate::storage::{JobLogEntry, JobLogStore};

/// 单次清理最多执行的批次数，防止无限循环
const MAX_CLEANUP_BATCHES: u32 = 1000;

pub struct JobLogService {
    store: Arc<dyn JobLogStore>,
    /// 保留天数，0 表示清空全部
    retention_days: u64,
    /// 每次删除批量大小
    batch_size: u64,
}

impl JobLogService {
    pub fn new(store: Arc<dyn JobLogStore>, config: &JobLogConfig) -> Self {
        Self {
            store,
            retention_days: config.retention_days,
            batch_size: config.batch_size.max(1),
        }
    }

    /// 写入一条任务日志，返回日志 ID
    pub async fn record(&self, entry: &JobLogEntry) -> Result<i64> {
        let id = self.store.insert_job_log(entry).await?;
        debug!(
            "Recorded job log {} for {} ({:?})",
            id, entry.job_name, entry.status
        );
        Ok(id)
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count_job_logs().await
    }

    /// 按保留策略计算截止时间，None 表示全部删除
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        (self.retention_days > 0).then(|| now - Duration::days(self.retention_days as i64))
    }

    /// 按保留策略清理日志（分批删除避免长事务）
    pub async fn clean_job_logs(&self) -> Result<u64> {
        self.clean_job_logs_at(Utc::now()).await
    }

    pub async fn clean_job_logs_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = self.cutoff(now);

        let mut total_deleted = 0u64;
        let mut batches = 0;

        loop {
            if batches >= MAX_CLEANUP_BATCHES {
                warn!(
                    "Job log cleanup reached max batches {} (deleted {} rows)",
                    MAX_CLEANUP_BATCHES, total_deleted
                );
                break;
            }

            let ids = self
                .store
                .job_log_ids_before(cutoff, self.batch_size)
                .await?;
            if ids.is_empty() {
                break;
            }

            let deleted = self.store.delete_job_logs(&ids).await?;
            total_deleted += deleted;
            batches += 1;

            debug!(
                "Job log cleanup batch {}: deleted {} rows (total {})",
                batches, deleted, total_deleted
            );

            // 不足一批说明已经没有更多数据
            if (ids.len() as u64) < self.batch_size {
                break;
            }

            // 短暂暂停，避免对数据库造成过大压力
            tokio::time::sleep(StdDuration::from_millis(20)).await;
        }

        match cutoff {
            Some(cutoff) => info!(
                "Job log cleanup deleted {} rows older than {}",
                total_deleted, cutoff
            ),
            None => info!("Job log cleanup deleted all {} rows", total_deleted),
        }
        Ok(total_deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoopStore;

    #[async_trait]
    impl JobLogStore for NoopStore {
        async fn insert_job_log(&self, _entry: &JobLogEntry) -> Result<i64> {
            Ok(1)
        }
        async fn job_log_ids_before(
            &self,
            _cutoff: Option<DateTime<Utc>>,
            _limit: u64,
        ) -> Result<Vec<i64>> {
            Ok(Vec::new())
        }
        async fn delete_job_logs(&self, _ids: &[i64]) -> Result<u64> {
            Ok(0)
        }
        async fn count_job_logs(&self) -> Result<u64> {
            Ok(0)
        }
    }

    #[test]
    fn test_cutoff() {
        let now = Utc::now();
        let keep_all = JobLogService::new(
            Arc::new(NoopStore),
            &JobLogConfig {
                retention_days: 0,
                batch_size: 10,
            },
        );
        assert_eq!(keep_all.cutoff(now), None);

        let week = JobLogService::new(
            Arc::new(NoopStore),
            &JobLogConfig {
                retention_days: 7,
                batch_size: 10,
            },
        );
        assert_eq!(week.cutoff(now), Some(now - Duration::days(7)));
    }

    #[tokio::test]
    async fn test_clean_with_no_logs() {
        let service = JobLogService::new(Arc::new(NoopStore), &JobLogConfig::default());
        assert_eq!(service.clean_job_logs().await.unwrap(), 0);
    }
}
