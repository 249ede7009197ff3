use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::SeaOrmStore;
use super::converters::model_to_article;
use crate::errors::Result;
use crate::storage::models::ArticleRecord;
use crate::storage::traits::ArticleStore;

use migration::entities::article;

#[async_trait]
impl ArticleStore for SeaOrmStore {
    async fn list_article_ids(&self) -> Result<Vec<i32>> {
        let db = &self.db;
        self.run("list_article_ids", || async {
            article::Entity::find()
                .select_only()
                .column(article::Column::Id)
                .order_by_asc(article::Column::Id)
                .into_tuple::<i32>()
                .all(db)
                .await
        })
        .await
    }

    async fn article_page(&self, after_id: i32, limit: u64) -> Result<Vec<ArticleRecord>> {
        let db = &self.db;
        let models = self
            .run("article_page", || async {
                article::Entity::find()
                    .filter(article::Column::Id.gt(after_id))
                    .order_by_asc(article::Column::Id)
                    .limit(limit)
                    .all(db)
                    .await
            })
            .await?;

        Ok(models.into_iter().map(model_to_article).collect())
    }

    async fn count_articles(&self) -> Result<u64> {
        let db = &self.db;
        self.run("count_articles", || async {
            article::Entity::find().count(db).await
        })
        .await
    }
}
