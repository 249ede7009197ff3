use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStore;
pub use models::{
    ArticleRecord, JobLogEntry, JobStatus, NewResource, ResourceRecord, RoleResource, UniqueView,
    UserInfoPatch, UserInfoRecord,
};
pub use traits::{ArticleStore, JobLogStore, ResourceStore, UserStore, VisitorStore};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStore>> {
        let store = SeaOrmStore::new(config).await?;
        Ok(Arc::new(store))
    }
}
