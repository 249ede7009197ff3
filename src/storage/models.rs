//! 存储层领域模型
//!
//! 与 `migration::entities` 中的表结构解耦，任务与服务只依赖这里的类型。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 每日独立访客快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueView {
    pub create_time: DateTime<Utc>,
    pub views_count: i32,
}

/// 重建搜索索引时读取的文章字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: i32,
    pub article_title: String,
    pub article_content: String,
    pub is_delete: i32,
    pub status: i32,
}

/// 待写入的接口资源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub resource_name: String,
    pub url: Option<String>,
    pub request_method: Option<String>,
    pub parent_id: Option<i32>,
    pub is_anonymous: bool,
}

impl NewResource {
    /// 模块资源（对应 API tag）
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            resource_name: name.into(),
            url: None,
            request_method: None,
            parent_id: None,
            is_anonymous: false,
        }
    }

    pub fn is_module(&self) -> bool {
        self.url.is_none() && self.request_method.is_none()
    }
}

/// 已存储的接口资源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub id: i32,
    pub resource_name: String,
    pub url: Option<String>,
    pub request_method: Option<String>,
    pub parent_id: Option<i32>,
}

impl ResourceRecord {
    pub fn is_module(&self) -> bool {
        self.url.is_none() && self.request_method.is_none()
    }
}

/// 角色与资源关联
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleResource {
    pub role_id: i32,
    pub resource_id: i32,
}

/// 任务执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Failed = 0,
    Succeeded = 1,
}

impl JobStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// 任务执行日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLogEntry {
    pub job_name: String,
    pub job_group: String,
    pub invoke_target: String,
    pub job_message: Option<String>,
    pub status: JobStatus,
    pub exception_info: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// 用户资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfoRecord {
    pub id: i32,
    pub email: Option<String>,
    pub nickname: String,
    pub avatar: String,
    pub intro: Option<String>,
    pub website: Option<String>,
    pub is_subscribe: bool,
    pub is_disable: bool,
}

/// 用户资料的部分更新，`None` 表示保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfoPatch {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub intro: Option<String>,
    pub website: Option<String>,
    pub is_subscribe: Option<bool>,
    pub is_disable: Option<bool>,
}
