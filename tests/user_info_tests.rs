//! UserInfoService tests
//!
//! Tests for the user profile service against a temporary SQLite store and
//! the in-memory cache.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use tempfile::TempDir;

use blogkeeper::cache::{KvCache, MemoryKvCache};
use blogkeeper::config::DatabaseConfig;
use blogkeeper::errors::BlogkeeperError;
use blogkeeper::services::{
    EmailBinding, SubscribeUpdate, UserDisableUpdate, UserInfoService, UserInfoUpdate,
    UserRoleUpdate,
};
use blogkeeper::storage::{SeaOrmStore, StorageFactory};
use migration::entities::user_info;

// =============================================================================
// Test Setup
// =============================================================================

struct Fixture {
    service: UserInfoService,
    store: Arc<SeaOrmStore>,
    cache: Arc<MemoryKvCache>,
    _temp_dir: TempDir,
}

async fn setup() -> Fixture {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };
    let store = StorageFactory::create(&config)
        .await
        .expect("Failed to create storage");
    let cache = Arc::new(MemoryKvCache::new());
    let service = UserInfoService::new(store.clone(), cache.clone(), "code:");

    Fixture {
        service,
        store,
        cache,
        _temp_dir: temp_dir,
    }
}

async fn create_user(store: &SeaOrmStore, email: Option<&str>) -> i32 {
    user_info::ActiveModel {
        email: Set(email.map(String::from)),
        nickname: Set("alice".to_string()),
        avatar: Set("https://example.com/a.png".to_string()),
        is_subscribe: Set(0),
        is_disable: Set(0),
        create_time: Set(Utc::now()),
        ..Default::default()
    }
    .insert(store.get_db())
    .await
    .expect("Failed to insert user")
    .id
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_get_missing_user_is_not_found() {
    let f = setup().await;
    let err = f.service.get_user_info_by_id(99).await.unwrap_err();
    assert!(matches!(err, BlogkeeperError::NotFound(_)));
}

#[tokio::test]
async fn test_update_user_info() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    f.service
        .update_user_info(
            id,
            UserInfoUpdate {
                nickname: "  Alice  ".to_string(),
                intro: Some("hello".to_string()),
                website: Some("https://alice.dev".to_string()),
            },
        )
        .await
        .unwrap();

    let user = f.service.get_user_info_by_id(id).await.unwrap();
    assert_eq!(user.nickname, "Alice");
    assert_eq!(user.intro.as_deref(), Some("hello"));
    assert_eq!(user.website.as_deref(), Some("https://alice.dev"));
    assert_eq!(user.avatar, "https://example.com/a.png");
}

#[tokio::test]
async fn test_blank_nickname_is_rejected() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    let err = f
        .service
        .update_user_info(
            id,
            UserInfoUpdate {
                nickname: "   ".to_string(),
                intro: None,
                website: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BlogkeeperError::Validation(_)));
}

// =============================================================================
// Email and subscription
// =============================================================================

#[tokio::test]
async fn test_save_user_email_with_valid_code() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;
    f.cache
        .set_string("code:alice@example.com", "123456")
        .await
        .unwrap();

    f.service
        .save_user_email(
            id,
            EmailBinding {
                email: "alice@example.com".to_string(),
                code: "123456".to_string(),
            },
        )
        .await
        .unwrap();

    let user = f.service.get_user_info_by_id(id).await.unwrap();
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
    // 验证码只能使用一次
    assert!(!f.cache.contains_key("code:alice@example.com"));
}

#[tokio::test]
async fn test_save_user_email_with_wrong_code() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;
    f.cache
        .set_string("code:alice@example.com", "123456")
        .await
        .unwrap();

    let err = f
        .service
        .save_user_email(
            id,
            EmailBinding {
                email: "alice@example.com".to_string(),
                code: "000000".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BlogkeeperError::Validation(_)));

    let user = f.service.get_user_info_by_id(id).await.unwrap();
    assert_eq!(user.email, None);
    assert!(f.cache.contains_key("code:alice@example.com"));
}

#[tokio::test]
async fn test_save_user_email_without_code() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    let result = f
        .service
        .save_user_email(
            id,
            EmailBinding {
                email: "alice@example.com".to_string(),
                code: "123456".to_string(),
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_subscribe_requires_email() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    let err = f
        .service
        .update_user_subscribe(
            id,
            SubscribeUpdate {
                email: None,
                is_subscribe: true,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BlogkeeperError::Validation(_)));

    f.service
        .update_user_subscribe(
            id,
            SubscribeUpdate {
                email: Some("alice@example.com".to_string()),
                is_subscribe: true,
            },
        )
        .await
        .unwrap();

    let user = f.service.get_user_info_by_id(id).await.unwrap();
    assert!(user.is_subscribe);
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn test_unsubscribe_without_email() {
    let f = setup().await;
    let id = create_user(&f.store, Some("alice@example.com")).await;

    for is_subscribe in [true, false] {
        f.service
            .update_user_subscribe(
                id,
                SubscribeUpdate {
                    email: None,
                    is_subscribe,
                },
            )
            .await
            .unwrap();
        let user = f.service.get_user_info_by_id(id).await.unwrap();
        assert_eq!(user.is_subscribe, is_subscribe);
    }
}

// =============================================================================
// Roles and disable
// =============================================================================

#[tokio::test]
async fn test_update_user_role_replaces_roles() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    f.service
        .update_user_role(UserRoleUpdate {
            user_info_id: id,
            nickname: "admin".to_string(),
            role_ids: vec![3, 1, 3],
        })
        .await
        .unwrap();
    let user = f.service.get_user_info_by_id(id).await.unwrap();
    assert_eq!(user.nickname, "admin");
    assert_eq!(user.role_ids, vec![1, 3]);

    f.service
        .update_user_role(UserRoleUpdate {
            user_info_id: id,
            nickname: "admin".to_string(),
            role_ids: vec![2],
        })
        .await
        .unwrap();
    assert_eq!(
        f.service.get_user_info_by_id(id).await.unwrap().role_ids,
        vec![2]
    );
}

#[tokio::test]
async fn test_update_role_for_missing_user() {
    let f = setup().await;
    let err = f
        .service
        .update_user_role(UserRoleUpdate {
            user_info_id: 42,
            nickname: "ghost".to_string(),
            role_ids: vec![1],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, BlogkeeperError::NotFound(_)));
}

#[tokio::test]
async fn test_update_user_disable() {
    let f = setup().await;
    let id = create_user(&f.store, None).await;

    f.service
        .update_user_disable(UserDisableUpdate {
            id,
            is_disable: true,
        })
        .await
        .unwrap();
    assert!(f.service.get_user_info_by_id(id).await.unwrap().is_disable);

    f.service
        .update_user_disable(UserDisableUpdate {
            id,
            is_disable: false,
        })
        .await
        .unwrap();
    assert!(!f.service.get_user_info_by_id(id).await.unwrap().is_disable);
}
