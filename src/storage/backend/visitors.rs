//! 访客统计相关的数据库操作

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use super::SeaOrmStore;
use super::converters::unique_view_to_active_model;
use crate::errors::Result;
use crate::storage::models::UniqueView;
use crate::storage::traits::VisitorStore;

use migration::entities::{unique_view, user_auth};

#[async_trait]
impl VisitorStore for SeaOrmStore {
    async fn insert_unique_view(&self, view: &UniqueView) -> Result<()> {
        // 插入不是幂等的，超时后重试可能写出两行快照
        unique_view::Entity::insert(unique_view_to_active_model(view))
            .exec(&self.db)
            .await?;

        debug!(
            "Inserted unique view snapshot: {} visitors at {}",
            view.views_count, view.create_time
        );
        Ok(())
    }

    async fn ip_source_page(
        &self,
        after_id: i32,
        limit: u64,
    ) -> Result<Vec<(i32, Option<String>)>> {
        let db = &self.db;
        self.run("ip_source_page", || async {
            user_auth::Entity::find()
                .select_only()
                .column(user_auth::Column::Id)
                .column(user_auth::Column::IpSource)
                .filter(user_auth::Column::Id.gt(after_id))
                .order_by_asc(user_auth::Column::Id)
                .limit(limit)
                .into_tuple::<(i32, Option<String>)>()
                .all(db)
                .await
        })
        .await
    }
}
