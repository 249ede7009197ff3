//! 用户登录信息实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_auths")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_info_id: i32,
    pub username: String,
    pub ip_address: Option<String>,
    /// IP 来源描述，例如 "中国|广东省|深圳市|电信"
    pub ip_source: Option<String>,
    pub last_login_time: Option<DateTimeUtc>,
    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
