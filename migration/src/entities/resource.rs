//! 接口资源实体
//!
//! 模块资源（API tag）没有 url / request_method，接口资源通过 parent_id 指向模块。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub resource_name: String,
    pub url: Option<String>,
    pub request_method: Option<String>,
    pub parent_id: Option<i32>,
    pub is_anonymous: i32,
    pub create_time: DateTimeUtc,
    pub update_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
