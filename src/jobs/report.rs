//! 任务执行结果

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::JobKind;

/// 独立访客集合的读取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "count", rename_all = "snake_case")]
pub enum VisitorSnapshot {
    /// 集合存在（可能为空）
    Present(u64),
    /// 集合不存在，当天没有任何访客记录
    Absent,
}

impl VisitorSnapshot {
    pub fn count(&self) -> u64 {
        match self {
            VisitorSnapshot::Present(n) => *n,
            VisitorSnapshot::Absent => 0,
        }
    }
}

/// 地区用户数，缓存为 `[{"name": ..., "value": ...}]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct UserArea {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoFailure {
    pub article_id: i32,
    pub reason: String,
}

/// 链接推送逐条结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeoReport {
    pub attempted: usize,
    pub succeeded: Vec<i32>,
    pub failed: Vec<SeoFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceImportReport {
    /// 文档中的资源总数（模块 + 接口）
    pub imported: usize,
    pub created: usize,
    pub updated: usize,
    /// 新增的管理员角色关联
    pub linked: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexRebuildReport {
    pub deleted: u64,
    pub indexed: u64,
}

/// 各任务的具体结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobOutcome {
    UniqueViewSaved {
        snapshot: VisitorSnapshot,
        create_time: DateTime<Utc>,
    },
    VisitorCacheCleared {
        keys_deleted: usize,
    },
    UserAreaComputed {
        users: u64,
        regions: Vec<UserArea>,
    },
    SeoPushed(SeoReport),
    JobLogsCleared {
        deleted: u64,
    },
    ResourcesImported(ResourceImportReport),
    SearchIndexRebuilt(IndexRebuildReport),
}

impl JobOutcome {
    /// 写入任务日志的简要说明
    pub fn summary(&self) -> String {
        match self {
            JobOutcome::UniqueViewSaved {
                snapshot: VisitorSnapshot::Present(n),
                create_time,
            } => format!("saved {} unique visitors for {}", n, create_time.date_naive()),
            JobOutcome::UniqueViewSaved {
                snapshot: VisitorSnapshot::Absent,
                create_time,
            } => format!(
                "unique visitor set absent, saved 0 for {}",
                create_time.date_naive()
            ),
            JobOutcome::VisitorCacheCleared { keys_deleted } => {
                format!("deleted {} visitor cache keys", keys_deleted)
            }
            JobOutcome::UserAreaComputed { users, regions } => {
                format!("{} users across {} regions", users, regions.len())
            }
            JobOutcome::SeoPushed(report) => format!(
                "pushed {}/{} article urls, {} failed",
                report.succeeded.len(),
                report.attempted,
                report.failed.len()
            ),
            JobOutcome::JobLogsCleared { deleted } => format!("deleted {} job logs", deleted),
            JobOutcome::ResourcesImported(r) => format!(
                "imported {} resources ({} created, {} updated), linked {}",
                r.imported, r.created, r.updated, r.linked
            ),
            JobOutcome::SearchIndexRebuilt(r) => {
                format!("deleted {} documents, indexed {}", r.deleted, r.indexed)
            }
        }
    }
}

/// 一次任务执行的报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub kind: JobKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: JobOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_is_distinct_from_zero() {
        assert_ne!(VisitorSnapshot::Absent, VisitorSnapshot::Present(0));
        assert_eq!(VisitorSnapshot::Absent.count(), 0);
    }

    #[test]
    fn test_user_area_json_shape() {
        let areas = vec![UserArea {
            name: "广东省".to_string(),
            value: 3,
        }];
        assert_eq!(
            serde_json::to_string(&areas).unwrap(),
            r#"[{"name":"广东省","value":3}]"#
        );
    }

    #[test]
    fn test_summary_mentions_failures() {
        let outcome = JobOutcome::SeoPushed(SeoReport {
            attempted: 3,
            succeeded: vec![1, 3],
            failed: vec![SeoFailure {
                article_id: 2,
                reason: "boom".to_string(),
            }],
        });
        assert_eq!(outcome.summary(), "pushed 2/3 article urls, 1 failed");
    }
}
