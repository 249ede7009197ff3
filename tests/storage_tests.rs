//! Storage backend tests
//!
//! Tests for SeaOrmStore using temporary SQLite databases.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, Database, DatabaseConnection, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait,
};
use tempfile::TempDir;

use blogkeeper::config::DatabaseConfig;
use blogkeeper::errors::BlogkeeperError;
use blogkeeper::storage::backend::{SeaOrmStore, infer_backend_from_url};
use blogkeeper::storage::{
    ArticleStore, JobLogEntry, JobLogStore, JobStatus, NewResource, ResourceStore, RoleResource,
    UniqueView, UserInfoPatch, UserStore, VisitorStore,
};
use migration::entities::{article, resource, unique_view, user_auth, user_info};

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let storage = SeaOrmStore::new(&config)
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

/// 从另一个连接开启写事务，占住 SQLite 写锁直到事务结束
async fn hold_write_lock(dir: &TempDir) -> (DatabaseConnection, DatabaseTransaction) {
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Database::connect(&url).await.expect("Failed to open second connection");
    let tx = db.begin().await.unwrap();
    unique_view::ActiveModel {
        views_count: Set(-1),
        create_time: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&tx)
    .await
    .unwrap();
    (db, tx)
}

fn job_log(name: &str, start: chrono::DateTime<Utc>, status: JobStatus) -> JobLogEntry {
    JobLogEntry {
        job_name: name.to_string(),
        job_group: "DEFAULT".to_string(),
        invoke_target: format!("{}()", name),
        job_message: Some("done".to_string()),
        status,
        exception_info: None,
        start_time: start,
        end_time: Some(start + Duration::seconds(1)),
    }
}

// =============================================================================
// URL 推断
// =============================================================================

#[cfg(test)]
mod url_inference_tests {
    use super::*;

    #[test]
    fn test_infer_backends() {
        assert_eq!(infer_backend_from_url("sqlite://blog.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("blog.sqlite").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mysql://root@localhost/blog").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("mariadb://root@localhost/blog").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/blog").unwrap(),
            "postgres"
        );
    }

    #[test]
    fn test_infer_unknown_backend_fails() {
        assert!(infer_backend_from_url("mongodb://localhost").is_err());
    }

    #[tokio::test]
    async fn test_empty_url_is_config_error() {
        let config = DatabaseConfig {
            database_url: String::new(),
            ..DatabaseConfig::default()
        };
        let err = SeaOrmStore::new(&config).await.err().unwrap();
        assert_eq!(err.code(), "E003");
    }
}

// =============================================================================
// 访客与文章
// =============================================================================

#[cfg(test)]
mod visitor_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_unique_view() {
        let (storage, _dir) = create_temp_storage().await;
        let create_time = Utc::now() - Duration::days(1);

        storage
            .insert_unique_view(&UniqueView {
                create_time,
                views_count: 42,
            })
            .await
            .unwrap();

        let rows = unique_view::Entity::find()
            .all(storage.get_db())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].views_count, 42);
        assert_eq!(rows[0].create_time.timestamp(), create_time.timestamp());
    }

    #[tokio::test]
    async fn test_slow_insert_unique_view_writes_one_row() {
        let (storage, dir) = create_temp_storage().await;
        let storage = storage.with_op_timeout(StdDuration::from_millis(50));

        // 写锁持有时间远超单次操作超时，插入只能等待而不能重发
        let (_blocker, tx) = hold_write_lock(&dir).await;
        let release = tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(300)).await;
            tx.rollback().await.unwrap();
        });

        storage
            .insert_unique_view(&UniqueView {
                create_time: Utc::now(),
                views_count: 7,
            })
            .await
            .unwrap();
        release.await.unwrap();

        let rows = unique_view::Entity::find()
            .all(storage.get_db())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].views_count, 7);
    }

    #[tokio::test]
    async fn test_ip_source_page_uses_keyset() {
        let (storage, _dir) = create_temp_storage().await;
        for (i, source) in [Some("中国|广东省|深圳市|电信"), None, Some("北京市 联通")]
            .into_iter()
            .enumerate()
        {
            user_auth::ActiveModel {
                user_info_id: Set(1),
                username: Set(format!("user{}", i)),
                ip_source: Set(source.map(String::from)),
                create_time: Set(Utc::now()),
                ..Default::default()
            }
            .insert(storage.get_db())
            .await
            .unwrap();
        }

        let first = storage.ip_source_page(0, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].1, None);

        let second = storage.ip_source_page(first[1].0, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].1.as_deref(), Some("北京市 联通"));

        assert!(storage.ip_source_page(second[0].0, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_articles_include_deleted() {
        let (storage, _dir) = create_temp_storage().await;
        for (title, is_delete) in [("a", 0), ("b", 1), ("c", 0)] {
            article::ActiveModel {
                user_id: Set(1),
                article_title: Set(title.to_string()),
                article_content: Set(String::new()),
                is_delete: Set(is_delete),
                status: Set(1),
                create_time: Set(Utc::now()),
                ..Default::default()
            }
            .insert(storage.get_db())
            .await
            .unwrap();
        }

        let ids = storage.list_article_ids().await.unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(storage.count_articles().await.unwrap(), 3);

        let page = storage.article_page(ids[0], 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].article_title, "b");
        assert_eq!(page[0].is_delete, 1);
    }
}

// =============================================================================
// 接口资源
// =============================================================================

#[cfg(test)]
mod resource_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_update_resource() {
        let (storage, _dir) = create_temp_storage().await;
        let module = storage
            .insert_resource(&NewResource::module("文章模块"))
            .await
            .unwrap();
        let endpoint = NewResource {
            resource_name: "查看文章".to_string(),
            url: Some("/articles/*".to_string()),
            request_method: Some("GET".to_string()),
            parent_id: Some(module),
            is_anonymous: false,
        };
        let id = storage.insert_resource(&endpoint).await.unwrap();

        let renamed = NewResource {
            resource_name: "根据id查看文章".to_string(),
            ..endpoint
        };
        storage.update_resource(id, &renamed).await.unwrap();

        let resources = storage.list_resources().await.unwrap();
        assert_eq!(resources.len(), 2);
        assert!(resources[0].is_module());
        assert_eq!(resources[1].resource_name, "根据id查看文章");
        assert_eq!(resources[1].parent_id, Some(module));
        assert_eq!(storage.list_resource_ids().await.unwrap(), vec![module, id]);
    }

    #[tokio::test]
    async fn test_reimport_update_keeps_anonymous_flag() {
        let (storage, _dir) = create_temp_storage().await;
        let endpoint = NewResource {
            resource_name: "查看文章".to_string(),
            url: Some("/articles/*".to_string()),
            request_method: Some("GET".to_string()),
            parent_id: None,
            is_anonymous: true,
        };
        let id = storage.insert_resource(&endpoint).await.unwrap();

        let reimported = NewResource {
            resource_name: "根据id查看文章".to_string(),
            is_anonymous: false,
            ..endpoint
        };
        storage.update_resource(id, &reimported).await.unwrap();

        let row = resource::Entity::find_by_id(id)
            .one(storage.get_db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.resource_name, "根据id查看文章");
        assert_eq!(row.is_anonymous, 1);
    }

    #[tokio::test]
    async fn test_locked_update_times_out_as_connection_error() {
        let (storage, dir) = create_temp_storage().await;
        let id = storage
            .insert_resource(&NewResource::module("文章模块"))
            .await
            .unwrap();
        let storage = storage.with_op_timeout(StdDuration::from_millis(50));

        let (_blocker, tx) = hold_write_lock(&dir).await;
        let err = storage
            .update_resource(id, &NewResource::module("文章"))
            .await
            .unwrap_err();
        tx.rollback().await.unwrap();

        match &err {
            BlogkeeperError::DatabaseConnection(msg) => {
                assert!(msg.contains("update_resource"), "unexpected message: {}", msg);
                assert!(msg.contains("timed out"), "unexpected message: {}", msg);
            }
            other => panic!("expected DatabaseConnection, got {:?}", other),
        }
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_role_resources() {
        let (storage, _dir) = create_temp_storage().await;
        assert_eq!(storage.insert_role_resources(&[]).await.unwrap(), 0);

        let links = [
            RoleResource {
                role_id: 1,
                resource_id: 10,
            },
            RoleResource {
                role_id: 1,
                resource_id: 11,
            },
            RoleResource {
                role_id: 2,
                resource_id: 10,
            },
        ];
        assert_eq!(storage.insert_role_resources(&links).await.unwrap(), 3);

        let admin = storage.role_resource_ids(1).await.unwrap();
        assert_eq!(admin.len(), 2);
        assert!(admin.contains(&10) && admin.contains(&11));

        // (role_id, resource_id) 唯一
        assert!(storage.insert_role_resources(&links[..1]).await.is_err());
    }
}

// =============================================================================
// 任务日志
// =============================================================================

#[cfg(test)]
mod job_log_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_before_cutoff() {
        let (storage, _dir) = create_temp_storage().await;
        let now = Utc::now();
        let old = storage
            .insert_job_log(&job_log("a", now - Duration::days(10), JobStatus::Succeeded))
            .await
            .unwrap();
        let recent = storage
            .insert_job_log(&job_log("b", now, JobStatus::Failed))
            .await
            .unwrap();

        let cutoff = Some(now - Duration::days(7));
        assert_eq!(storage.job_log_ids_before(cutoff, 10).await.unwrap(), vec![old]);
        assert_eq!(
            storage.job_log_ids_before(None, 10).await.unwrap(),
            vec![old, recent]
        );
        assert_eq!(storage.job_log_ids_before(None, 1).await.unwrap(), vec![old]);
    }

    #[tokio::test]
    async fn test_delete_job_logs() {
        let (storage, _dir) = create_temp_storage().await;
        let mut ids = Vec::new();
        for i in 0..3 {
            ids.push(
                storage
                    .insert_job_log(&job_log(&format!("job{}", i), Utc::now(), JobStatus::Succeeded))
                    .await
                    .unwrap(),
            );
        }

        assert_eq!(storage.delete_job_logs(&[]).await.unwrap(), 0);
        assert_eq!(storage.delete_job_logs(&ids[..2]).await.unwrap(), 2);
        assert_eq!(storage.count_job_logs().await.unwrap(), 1);
    }
}

// =============================================================================
// 用户资料
// =============================================================================

#[cfg(test)]
mod user_store_tests {
    use super::*;

    async fn create_user(storage: &SeaOrmStore) -> i32 {
        user_info::ActiveModel {
            nickname: Set("alice".to_string()),
            avatar: Set("https://example.com/a.png".to_string()),
            is_subscribe: Set(0),
            is_disable: Set(0),
            create_time: Set(Utc::now()),
            ..Default::default()
        }
        .insert(storage.get_db())
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (storage, _dir) = create_temp_storage().await;
        let id = create_user(&storage).await;

        let updated = storage
            .update_user_info(
                id,
                &UserInfoPatch {
                    email: Some("alice@example.com".to_string()),
                    is_subscribe: Some(true),
                    ..UserInfoPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated);

        let user = storage.find_user_info(id).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert!(user.is_subscribe);
        assert!(!user.is_disable);
        assert_eq!(user.nickname, "alice");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (storage, _dir) = create_temp_storage().await;
        let patch = UserInfoPatch {
            is_disable: Some(true),
            ..UserInfoPatch::default()
        };
        assert!(!storage.update_user_info(404, &patch).await.unwrap());
        assert!(storage.find_user_info(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_user_roles() {
        let (storage, _dir) = create_temp_storage().await;
        let id = create_user(&storage).await;

        storage.replace_user_roles(id, &[3, 1]).await.unwrap();
        assert_eq!(storage.user_role_ids(id).await.unwrap(), vec![1, 3]);

        storage.replace_user_roles(id, &[2]).await.unwrap();
        assert_eq!(storage.user_role_ids(id).await.unwrap(), vec![2]);

        storage.replace_user_roles(id, &[]).await.unwrap();
        assert!(storage.user_role_ids(id).await.unwrap().is_empty());
    }
}
