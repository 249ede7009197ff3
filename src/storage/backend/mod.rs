//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod articles;
mod connection;
mod converters;
mod job_logs;
mod resources;
pub mod retry;
mod users;
mod visitors;

use std::time::Duration;

use sea_orm::{DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{BlogkeeperError, Result};
use crate::utils::RetryConfig;

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(BlogkeeperError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
    /// 重试配置
    retry_config: RetryConfig,
    /// 单次操作超时
    op_timeout: Duration,
}

impl SeaOrmStore {
    /// 连接数据库并运行迁移
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(BlogkeeperError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let backend_name = infer_backend_from_url(database_url)?;

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&normalize_sqlite_url(database_url)).await?
        } else {
            connect_generic(database_url, &backend_name, config.pool_size).await?
        };

        run_migrations(&db).await?;

        let store = Self::from_connection(db, &backend_name, config);
        info!("{} store initialized", store.backend_name.to_uppercase());
        Ok(store)
    }

    /// 用已有连接构建（连接已完成迁移）
    pub fn from_connection(
        db: DatabaseConnection,
        backend_name: &str,
        config: &DatabaseConfig,
    ) -> Self {
        Self {
            db,
            backend_name: backend_name.to_string(),
            retry_config: RetryConfig {
                max_retries: config.retry_count,
                base_delay_ms: config.retry_base_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
            },
            op_timeout: Duration::from_secs(config.timeout.max(1)),
        }
    }

    /// 覆盖单次操作超时
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 带超时与重试地执行一次数据库操作
    async fn run<T, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, DbErr>>,
    {
        retry::with_retry_timeout(operation_name, self.retry_config, self.op_timeout, operation)
            .await
            .map_err(BlogkeeperError::from)
    }
}

/// 纯文件路径补全为 sqlite:// URL
fn normalize_sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://blog.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("blog.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u@h/db").unwrap(), "mysql");
        assert_eq!(
            infer_backend_from_url("postgresql://u@h/db").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("oracle://x").is_err());
    }

    #[test]
    fn test_normalize_sqlite_url() {
        assert_eq!(normalize_sqlite_url("blog.db"), "sqlite://blog.db?mode=rwc");
        assert_eq!(normalize_sqlite_url("sqlite://a.db"), "sqlite://a.db");
        assert_eq!(normalize_sqlite_url(":memory:"), "sqlite::memory:");
    }
}
