//! 用户资料与角色的数据库操作

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};
use tracing::debug;

use super::SeaOrmStore;
use super::converters::model_to_user_info;
use crate::errors::Result;
use crate::storage::models::{UserInfoPatch, UserInfoRecord};
use crate::storage::traits::UserStore;

use migration::entities::{user_info, user_role};

#[async_trait]
impl UserStore for SeaOrmStore {
    async fn find_user_info(&self, id: i32) -> Result<Option<UserInfoRecord>> {
        let db = &self.db;
        let model = self
            .run("find_user_info", || async {
                user_info::Entity::find_by_id(id).one(db).await
            })
            .await?;

        Ok(model.map(model_to_user_info))
    }

    async fn update_user_info(&self, id: i32, patch: &UserInfoPatch) -> Result<bool> {
        let active = user_info::ActiveModel {
            id: Set(id),
            email: patch.email.clone().map(|v| Set(Some(v))).unwrap_or(NotSet),
            nickname: patch.nickname.clone().map(Set).unwrap_or(NotSet),
            avatar: NotSet,
            intro: patch.intro.clone().map(|v| Set(Some(v))).unwrap_or(NotSet),
            website: patch.website.clone().map(|v| Set(Some(v))).unwrap_or(NotSet),
            is_subscribe: patch
                .is_subscribe
                .map(|v| Set(i32::from(v)))
                .unwrap_or(NotSet),
            is_disable: patch.is_disable.map(|v| Set(i32::from(v))).unwrap_or(NotSet),
            create_time: NotSet,
            update_time: Set(Some(Utc::now())),
        };

        let db = &self.db;
        let result = self
            .run("update_user_info", || {
                let active = active.clone();
                async move {
                    user_info::Entity::update_many()
                        .set(active)
                        .filter(user_info::Column::Id.eq(id))
                        .exec(db)
                        .await
                }
            })
            .await?;

        debug!("update_user_info({}) affected {} rows", id, result.rows_affected);
        Ok(result.rows_affected > 0)
    }

    async fn replace_user_roles(&self, user_info_id: i32, role_ids: &[i32]) -> Result<()> {
        let txn = self.db.begin().await?;

        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_info_id))
            .exec(&txn)
            .await?;

        if !role_ids.is_empty() {
            let models = role_ids.iter().map(|role_id| user_role::ActiveModel {
                id: NotSet,
                user_id: Set(user_info_id),
                role_id: Set(*role_id),
            });
            user_role::Entity::insert_many(models).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn user_role_ids(&self, user_info_id: i32) -> Result<Vec<i32>> {
        let db = &self.db;
        self.run("user_role_ids", || async {
            user_role::Entity::find()
                .select_only()
                .column(user_role::Column::RoleId)
                .filter(user_role::Column::UserId.eq(user_info_id))
                .order_by_asc(user_role::Column::RoleId)
                .into_tuple::<i32>()
                .all(db)
                .await
        })
        .await
    }
}
