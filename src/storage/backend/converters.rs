use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::models::{
    ArticleRecord, JobLogEntry, NewResource, ResourceRecord, UniqueView, UserInfoRecord,
};
use migration::entities::{article, job_log, resource, unique_view, user_info};

pub fn unique_view_to_active_model(view: &UniqueView) -> unique_view::ActiveModel {
    unique_view::ActiveModel {
        id: NotSet,
        views_count: Set(view.views_count),
        create_time: Set(view.create_time),
    }
}

pub fn model_to_article(model: article::Model) -> ArticleRecord {
    ArticleRecord {
        id: model.id,
        article_title: model.article_title,
        article_content: model.article_content,
        is_delete: model.is_delete,
        status: model.status,
    }
}

pub fn model_to_resource(model: resource::Model) -> ResourceRecord {
    ResourceRecord {
        id: model.id,
        resource_name: model.resource_name,
        url: model.url,
        request_method: model.request_method,
        parent_id: model.parent_id,
    }
}

/// 将 NewResource 转换为 ActiveModel
///
/// `id` 为 None 时生成插入用模型（带 create_time），否则生成更新用模型（带 update_time）。
/// 更新时不写 is_anonymous，保留管理员手动设置的匿名标记
pub fn resource_to_active_model(res: &NewResource, id: Option<i32>) -> resource::ActiveModel {
    let now = Utc::now();
    resource::ActiveModel {
        id: id.map(Set).unwrap_or(NotSet),
        resource_name: Set(res.resource_name.clone()),
        url: Set(res.url.clone()),
        request_method: Set(res.request_method.clone()),
        parent_id: Set(res.parent_id),
        is_anonymous: if id.is_none() {
            Set(i32::from(res.is_anonymous))
        } else {
            NotSet
        },
        create_time: if id.is_none() { Set(now) } else { NotSet },
        update_time: if id.is_some() { Set(Some(now)) } else { NotSet },
    }
}

pub fn job_log_to_active_model(entry: &JobLogEntry) -> job_log::ActiveModel {
    job_log::ActiveModel {
        id: NotSet,
        job_name: Set(entry.job_name.clone()),
        job_group: Set(entry.job_group.clone()),
        invoke_target: Set(entry.invoke_target.clone()),
        job_message: Set(entry.job_message.clone()),
        status: Set(entry.status.as_i32()),
        exception_info: Set(entry.exception_info.clone()),
        start_time: Set(entry.start_time),
        end_time: Set(entry.end_time),
        create_time: Set(entry.start_time),
    }
}

pub fn model_to_user_info(model: user_info::Model) -> UserInfoRecord {
    UserInfoRecord {
        id: model.id,
        email: model.email,
        nickname: model.nickname,
        avatar: model.avatar,
        intro: model.intro,
        website: model.website,
        is_subscribe: model.is_subscribe == 1,
        is_disable: model.is_disable == 1,
    }
}
