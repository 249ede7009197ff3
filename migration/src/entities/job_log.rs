//! 任务执行日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "job_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub job_name: String,
    pub job_group: String,
    pub invoke_target: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub job_message: Option<String>,
    /// 1 成功, 0 失败
    pub status: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub exception_info: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: Option<DateTimeUtc>,
    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
