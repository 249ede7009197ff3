//! 通用重试模块
//!
//! 指数退避 + 随机抖动，调用方通过 `is_retryable` 决定哪些错误值得重试。
//! 数据库、搜索索引与 SEO 推送共用这一套执行器。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// 不重试，只执行一次
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// 指数退避重试执行器
///
/// 对 `is_retryable` 返回 true 的错误自动重试，最多 `max_retries` 次
pub async fn retry_if<T, E, F, Fut, P>(
    operation_name: &str,
    config: RetryConfig,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if is_retryable(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => {
                debug!("Operation '{}' failed without retry: {}", operation_name, e);
                return Err(e);
            }
        }
    }
}

/// 带超时的重试执行器
///
/// 与 `retry_if` 相同，但每次操作有独立的超时控制；超时视为可重试，
/// 重试耗尽后由 `on_timeout` 构造错误
pub async fn retry_if_with_timeout<T, E, F, Fut, P, O>(
    operation_name: &str,
    config: RetryConfig,
    timeout: Duration,
    is_retryable: P,
    on_timeout: O,
    mut operation: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    O: Fn(&str, Duration) -> E,
{
    let mut attempt = 0;
    loop {
        match tokio::time::timeout(timeout, operation()).await {
            Ok(Ok(value)) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(value);
            }
            Ok(Err(e)) if is_retryable(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Ok(Err(e)) => {
                debug!("Operation '{}' failed without retry: {}", operation_name, e);
                return Err(e);
            }
            Err(_elapsed) if attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' timed out after {:?} (attempt {}/{}); retrying in {} ms",
                    operation_name,
                    timeout,
                    attempt,
                    config.max_retries + 1,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(_elapsed) => {
                warn!(
                    "Operation '{}' timed out after {:?}, retries exhausted",
                    operation_name, timeout
                );
                return Err(on_timeout(operation_name, timeout));
            }
        }
    }
}

/// 计算指数退避延迟（带抖动）
pub(crate) fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    // 添加 0-25% 的随机抖动，避免惊群效应
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}
