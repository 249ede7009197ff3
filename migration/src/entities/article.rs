//! 文章实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub article_cover: Option<String>,
    pub article_title: String,
    #[sea_orm(column_type = "Text")]
    pub article_content: String,
    /// 0 正常, 1 已删除
    pub is_delete: i32,
    /// 1 公开, 2 私密, 3 草稿
    pub status: i32,
    pub create_time: DateTimeUtc,
    pub update_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
