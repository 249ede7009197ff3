use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::converters::job_log_to_active_model;
use super::{SeaOrmStore, retry};
use crate::errors::Result;
use crate::storage::models::JobLogEntry;
use crate::storage::traits::JobLogStore;

use migration::entities::job_log;

#[async_trait]
impl JobLogStore for SeaOrmStore {
    async fn insert_job_log(&self, entry: &JobLogEntry) -> Result<i64> {
        let result = job_log::Entity::insert(job_log_to_active_model(entry))
            .exec(&self.db)
            .await?;
        Ok(result.last_insert_id)
    }

    async fn job_log_ids_before(
        &self,
        cutoff: Option<DateTime<Utc>>,
        limit: u64,
    ) -> Result<Vec<i64>> {
        let db = &self.db;
        self.run("job_log_ids_before", || async {
            let mut query = job_log::Entity::find()
                .select_only()
                .column(job_log::Column::Id);
            if let Some(cutoff) = cutoff {
                query = query.filter(job_log::Column::CreateTime.lt(cutoff));
            }
            query
                .order_by_asc(job_log::Column::Id)
                .limit(limit)
                .into_tuple::<i64>()
                .all(db)
                .await
        })
        .await
    }

    async fn delete_job_logs(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // 大批量删除可能超过单次操作超时，只做重试不限时
        let db = &self.db;
        let result = retry::with_retry("delete_job_logs", self.retry_config, || async {
            job_log::Entity::delete_many()
                .filter(job_log::Column::Id.is_in(ids.iter().copied()))
                .exec(db)
                .await
        })
        .await?;

        Ok(result.rows_affected)
    }

    async fn count_job_logs(&self) -> Result<u64> {
        let db = &self.db;
        self.run("count_job_logs", || async {
            job_log::Entity::find().count(db).await
        })
        .await
    }
}
