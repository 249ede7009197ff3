//! 存储协作方接口
//!
//! 任务与服务通过这些 trait 访问关系型存储，便于替换实现与测试。

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{
    ArticleRecord, JobLogEntry, NewResource, ResourceRecord, RoleResource, UniqueView,
    UserInfoPatch, UserInfoRecord,
};
use crate::errors::Result;

/// 访客统计相关
#[async_trait]
pub trait VisitorStore: Send + Sync {
    async fn insert_unique_view(&self, view: &UniqueView) -> Result<()>;

    /// 按主键分页读取用户 IP 来源，只投影 (id, ip_source) 两列
    async fn ip_source_page(&self, after_id: i32, limit: u64)
    -> Result<Vec<(i32, Option<String>)>>;
}

/// 文章
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn list_article_ids(&self) -> Result<Vec<i32>>;

    /// 按主键分页读取文章
    async fn article_page(&self, after_id: i32, limit: u64) -> Result<Vec<ArticleRecord>>;

    async fn count_articles(&self) -> Result<u64>;
}

/// 接口资源与角色授权
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list_resources(&self) -> Result<Vec<ResourceRecord>>;

    async fn list_resource_ids(&self) -> Result<Vec<i32>>;

    /// 插入资源并返回新 ID
    async fn insert_resource(&self, resource: &NewResource) -> Result<i32>;

    async fn update_resource(&self, id: i32, resource: &NewResource) -> Result<()>;

    /// 角色已关联的资源 ID
    async fn role_resource_ids(&self, role_id: i32) -> Result<HashSet<i32>>;

    /// 批量插入关联，返回插入条数
    async fn insert_role_resources(&self, links: &[RoleResource]) -> Result<u64>;
}

/// 任务日志
#[async_trait]
pub trait JobLogStore: Send + Sync {
    async fn insert_job_log(&self, entry: &JobLogEntry) -> Result<i64>;

    /// `cutoff` 为 None 时返回任意日志 ID（用于全部清理）
    async fn job_log_ids_before(
        &self,
        cutoff: Option<DateTime<Utc>>,
        limit: u64,
    ) -> Result<Vec<i64>>;

    async fn delete_job_logs(&self, ids: &[i64]) -> Result<u64>;

    async fn count_job_logs(&self) -> Result<u64>;
}

/// 用户资料
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_info(&self, id: i32) -> Result<Option<UserInfoRecord>>;

    /// 更新资料，返回是否命中记录
    async fn update_user_info(&self, id: i32, patch: &UserInfoPatch) -> Result<bool>;

    /// 替换用户的全部角色
    async fn replace_user_roles(&self, user_info_id: i32, role_ids: &[i32]) -> Result<()>;

    async fn user_role_ids(&self, user_info_id: i32) -> Result<Vec<i32>>;
}
