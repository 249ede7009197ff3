//! 数据库操作重试模块
//!
//! 识别可重试的数据库错误（断线、死锁、锁超时），并包装通用重试执行器

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;

use crate::utils::{RetryConfig, retry_if, retry_if_with_timeout};

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | // 连接池获取失败
        DbErr::Conn(_) => true, // 连接问题
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

/// 判断运行时错误是否可重试（死锁、锁超时等）
fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error() {
                // 通过错误码识别可重试错误
                if let Some(code) = db_err.code() {
                    let code_str = code.as_ref();
                    return matches!(
                        code_str,
                        // MySQL 死锁和锁超时
                        "1213" | "1205" |
                        // PostgreSQL 序列化失败和死锁
                        "40001" | "40P01" |
                        // SQLite BUSY 和 LOCKED
                        "5" | "6"
                    );
                }
            }
            // 回退到字符串匹配（用于非 Database 错误）
            let err_str = sqlx_err.to_string().to_lowercase();
            is_retryable_error_message(&err_str)
        }
        RuntimeErr::Internal(msg) => {
            let err_str = msg.to_lowercase();
            is_retryable_error_message(&err_str)
        }
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 通过错误消息判断是否可重试（回退方案）
fn is_retryable_error_message(err_str: &str) -> bool {
    err_str.contains("deadlock")
        || err_str.contains("lock wait timeout")
        || err_str.contains("database is locked")
        || err_str.contains("serialization failure")
}

/// 数据库操作重试执行器
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_if(operation_name, config, is_retryable_error, operation).await
}

/// 带超时的数据库操作重试执行器，每次尝试独立计时
pub async fn with_retry_timeout<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    timeout: Duration,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    retry_if_with_timeout(
        operation_name,
        config,
        timeout,
        is_retryable_error,
        |name, elapsed| {
            DbErr::Conn(sea_orm::error::RuntimeErr::Internal(format!(
                "Operation '{}' timed out after {}ms",
                name,
                elapsed.as_millis()
            )))
        },
        operation,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_is_retryable_error_connection_acquire() {
        let err = DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_conn() {
        let err = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "connection lost".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_record_not_found() {
        let err = DbErr::RecordNotFound("not found".to_string());
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_deadlock() {
        // 测试死锁错误应该被重试
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_database_locked() {
        // 测试 SQLite 数据库锁定错误应该被重试
        let err = DbErr::Query(sea_orm::error::RuntimeErr::Internal(
            "database is locked".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_lock_wait_timeout() {
        // 测试锁等待超时应该被重试
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Lock wait timeout exceeded".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[tokio::test]
    async fn test_with_retry_success_first_try() {
        let config = RetryConfig::default();
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DbErr>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_success_after_retries() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 10, // 短延迟加速测试
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3); // 初始 + 2 次重试
    }

    #[tokio::test]
    async fn test_with_retry_exhausted() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(DbErr::ConnectionAcquire(
                    sea_orm::error::ConnAcquireErr::Timeout,
                ))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 3); // 初始 + 2 次重试
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error_no_retry() {
        let config = RetryConfig::default();
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(DbErr::RecordNotFound("not found".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1); // 不可重试，只调用一次
    }

    #[tokio::test]
    async fn test_with_retry_timeout_reports_connection_error() {
        let config = RetryConfig {
            max_retries: 1,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let call_count = AtomicU32::new(0);

        let result: Result<i32, DbErr> =
            with_retry_timeout("slow_op", config, Duration::from_millis(20), || {
                call_count.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(1)
                }
            })
            .await;

        // 超时被视为连接问题，最终映射为不可用
        assert!(matches!(result, Err(DbErr::Conn(_))));
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
