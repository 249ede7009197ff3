//! 接口资源与角色授权的数据库操作

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, info};

use super::SeaOrmStore;
use super::converters::{model_to_resource, resource_to_active_model};
use crate::errors::Result;
use crate::storage::models::{NewResource, ResourceRecord, RoleResource};
use crate::storage::traits::ResourceStore;

use migration::entities::{resource, role_resource};

#[async_trait]
impl ResourceStore for SeaOrmStore {
    async fn list_resources(&self) -> Result<Vec<ResourceRecord>> {
        let db = &self.db;
        let models = self
            .run("list_resources", || async {
                resource::Entity::find()
                    .order_by_asc(resource::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        Ok(models.into_iter().map(model_to_resource).collect())
    }

    async fn list_resource_ids(&self) -> Result<Vec<i32>> {
        let db = &self.db;
        self.run("list_resource_ids", || async {
            resource::Entity::find()
                .select_only()
                .column(resource::Column::Id)
                .order_by_asc(resource::Column::Id)
                .into_tuple::<i32>()
                .all(db)
                .await
        })
        .await
    }

    async fn insert_resource(&self, res: &NewResource) -> Result<i32> {
        // 插入不是幂等的，不做重试
        let result = resource::Entity::insert(resource_to_active_model(res, None))
            .exec(&self.db)
            .await?;

        debug!(
            "Inserted resource {} ({:?} {:?})",
            result.last_insert_id, res.request_method, res.url
        );
        Ok(result.last_insert_id)
    }

    async fn update_resource(&self, id: i32, res: &NewResource) -> Result<()> {
        let db = &self.db;
        self.run("update_resource", || async {
            resource::Entity::update(resource_to_active_model(res, Some(id)))
                .exec(db)
                .await
        })
        .await?;
        Ok(())
    }

    async fn role_resource_ids(&self, role_id: i32) -> Result<HashSet<i32>> {
        let db = &self.db;
        let ids = self
            .run("role_resource_ids", || async {
                role_resource::Entity::find()
                    .select_only()
                    .column(role_resource::Column::ResourceId)
                    .filter(role_resource::Column::RoleId.eq(role_id))
                    .into_tuple::<i32>()
                    .all(db)
                    .await
            })
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn insert_role_resources(&self, links: &[RoleResource]) -> Result<u64> {
        if links.is_empty() {
            return Ok(0);
        }

        let models = links.iter().map(|link| role_resource::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            role_id: sea_orm::ActiveValue::Set(link.role_id),
            resource_id: sea_orm::ActiveValue::Set(link.resource_id),
        });

        // 唯一索引 (role_id, resource_id) 兜底，重复关联会让整批失败
        role_resource::Entity::insert_many(models)
            .exec(&self.db)
            .await?;

        info!("Linked {} resources to roles", links.len());
        Ok(links.len() as u64)
    }
}
