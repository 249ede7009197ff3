//! 任务执行器
//!
//! 每次 `run` 执行一个任务：记录开始与结束、写入一条任务日志、返回报告。
//! 任务之间不共享内存状态，只共享注入的协作方句柄。

use std::sync::Arc;

use chrono::Utc;
use tracing::{Instrument, error, info, info_span, warn};

use super::{JobKind, JobOutcome, JobReport};
use crate::cache::KvCache;
use crate::config::{CacheKeysConfig, DEFAULT_ADMIN_ROLE_ID, StaticConfig};
use crate::errors::Result;
use crate::search::SearchIndex;
use crate::services::{JobLogService, RegionLookup, ResourceImporter, SeoNotifier};
use crate::storage::{ArticleStore, JobLogEntry, JobStatus, ResourceStore, VisitorStore};

/// 任务依赖的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub cache: Arc<dyn KvCache>,
    pub visitors: Arc<dyn VisitorStore>,
    pub articles: Arc<dyn ArticleStore>,
    pub resources: Arc<dyn ResourceStore>,
    pub search: Arc<dyn SearchIndex>,
    pub seo: Arc<dyn SeoNotifier>,
    pub regions: Arc<dyn RegionLookup>,
    pub importer: Arc<dyn ResourceImporter>,
    pub job_logs: Arc<JobLogService>,
}

/// 任务参数
#[derive(Debug, Clone)]
pub struct JobSettings {
    /// 站点地址，用于拼接文章链接
    pub website_url: String,
    pub keys: CacheKeysConfig,
    pub admin_role_id: i32,
    /// 扫描用户 IP 来源时的分页大小
    pub scan_page_size: u64,
    /// 重建索引时每批文章数
    pub index_batch_size: u64,
    pub seo_concurrency: usize,
    pub job_group: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            website_url: "http://localhost".to_string(),
            keys: CacheKeysConfig::default(),
            admin_role_id: DEFAULT_ADMIN_ROLE_ID,
            scan_page_size: 1000,
            index_batch_size: 200,
            seo_concurrency: 4,
            job_group: "DEFAULT".to_string(),
        }
    }
}

impl JobSettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            website_url: config.website.url.clone(),
            keys: config.cache.keys.clone(),
            admin_role_id: config.jobs.admin_role_id,
            scan_page_size: config.jobs.scan_page_size.max(1),
            index_batch_size: config.search.batch_size.max(1),
            seo_concurrency: config.seo.concurrency.max(1),
            job_group: config.jobs.group.clone(),
        }
    }
}

pub struct JobRunner {
    pub(super) collaborators: Collaborators,
    pub(super) settings: JobSettings,
}

impl JobRunner {
    pub fn new(collaborators: Collaborators, settings: JobSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    async fn dispatch(&self, kind: JobKind) -> Result<JobOutcome> {
        match kind {
            JobKind::SaveUniqueView => self.save_unique_view().await,
            JobKind::ClearVisitorCache => self.clear_visitor_cache().await,
            JobKind::UserAreaStats => self.statistical_user_area().await,
            JobKind::SeoPush => self.seo_push().await.map(JobOutcome::SeoPushed),
            JobKind::ClearJobLogs => self.clear_job_logs().await,
            JobKind::ImportApiResources => self
                .import_api_resources()
                .await
                .map(JobOutcome::ResourcesImported),
            JobKind::RebuildSearchIndex => self
                .rebuild_search_index()
                .await
                .map(JobOutcome::SearchIndexRebuilt),
        }
    }

    /// 执行一个任务并记录任务日志
    ///
    /// 任务日志写入失败只记录告警，不影响任务本身的结果
    pub async fn run(&self, kind: JobKind) -> Result<JobReport> {
        let started_at = Utc::now();
        let span = info_span!("job", name = %kind, group = %self.settings.job_group);

        let result = async {
            info!("Job {} started at {}", kind, started_at);
            self.dispatch(kind).await
        }
        .instrument(span.clone())
        .await;

        let finished_at = Utc::now();
        let entry = JobLogEntry {
            job_name: kind.to_string(),
            job_group: self.settings.job_group.clone(),
            invoke_target: kind.invoke_target().to_string(),
            job_message: result.as_ref().ok().map(JobOutcome::summary),
            status: if result.is_ok() {
                JobStatus::Succeeded
            } else {
                JobStatus::Failed
            },
            exception_info: result.as_ref().err().map(|e| e.format_simple()),
            start_time: started_at,
            end_time: Some(finished_at),
        };

        if let Err(e) = self
            .collaborators
            .job_logs
            .record(&entry)
            .instrument(span.clone())
            .await
        {
            span.in_scope(|| warn!("Failed to record job log for {}: {}", kind, e));
        }

        let elapsed_ms = (finished_at - started_at).num_milliseconds();
        span.in_scope(|| match result {
            Ok(outcome) => {
                info!(
                    "Job {} finished at {} in {}ms: {}",
                    kind,
                    finished_at,
                    elapsed_ms,
                    outcome.summary()
                );
                Ok(JobReport {
                    kind,
                    started_at,
                    finished_at,
                    outcome,
                })
            }
            Err(e) => {
                error!(
                    "Job {} failed at {} after {}ms: {} [{}]",
                    kind,
                    finished_at,
                    elapsed_ms,
                    e,
                    e.code()
                );
                Err(e)
            }
        })
    }

    /// 按顺序执行多个任务，遇到第一个失败即停止
    pub async fn run_sequence(&self, kinds: &[JobKind]) -> Result<Vec<JobReport>> {
        let mut reports = Vec::with_capacity(kinds.len());
        for kind in kinds {
            reports.push(self.run(*kind).await?);
        }
        Ok(reports)
    }

    /// 每日访客周期：保存快照 → 地域统计 → 清空缓存
    ///
    /// 前两步任一失败都不会清空缓存
    pub async fn run_visitor_cycle(&self) -> Result<Vec<JobReport>> {
        self.run_sequence(&JobKind::visitor_cycle()).await
    }
}
