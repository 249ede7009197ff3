use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// 可调度的维护任务
///
/// 名称是稳定的 kebab-case 字符串，供 CLI 与任务日志使用
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// 保存昨日独立访客数
    SaveUniqueView,
    /// 清空访客集合与游客地域统计
    ClearVisitorCache,
    /// 统计用户地域分布
    UserAreaStats,
    /// 推送文章链接到搜索引擎
    SeoPush,
    /// 按保留策略清理任务日志
    ClearJobLogs,
    /// 从 API 文档导入接口资源并授权给管理员
    ImportApiResources,
    /// 重建文章搜索索引
    RebuildSearchIndex,
}

impl JobKind {
    /// 任务日志中的调用目标
    pub fn invoke_target(&self) -> &'static str {
        match self {
            JobKind::SaveUniqueView => "blogkeeper::jobs::save_unique_view",
            JobKind::ClearVisitorCache => "blogkeeper::jobs::clear_visitor_cache",
            JobKind::UserAreaStats => "blogkeeper::jobs::statistical_user_area",
            JobKind::SeoPush => "blogkeeper::jobs::seo_push",
            JobKind::ClearJobLogs => "blogkeeper::jobs::clear_job_logs",
            JobKind::ImportApiResources => "blogkeeper::jobs::import_api_resources",
            JobKind::RebuildSearchIndex => "blogkeeper::jobs::rebuild_search_index",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            JobKind::SaveUniqueView => "Snapshot yesterday's unique visitor count",
            JobKind::ClearVisitorCache => "Delete the unique visitor set and visitor area cache",
            JobKind::UserAreaStats => "Aggregate users by region and cache the result",
            JobKind::SeoPush => "Push every article URL to the search engine",
            JobKind::ClearJobLogs => "Delete job logs according to the retention policy",
            JobKind::ImportApiResources => "Import API resources and grant them to the admin role",
            JobKind::RebuildSearchIndex => "Rebuild the article search index from the database",
        }
    }

    /// 每日访客周期：先保存、再统计、最后清空
    pub fn visitor_cycle() -> [JobKind; 3] {
        [
            JobKind::SaveUniqueView,
            JobKind::UserAreaStats,
            JobKind::ClearVisitorCache,
        ]
    }
}
