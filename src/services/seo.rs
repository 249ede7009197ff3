//! 搜索引擎链接推送
//!
//! 每篇文章一次 POST，请求体为文章公开链接（纯文本）。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};
use ureq::Agent;

use crate::config::SeoConfig;
use crate::errors::{BlogkeeperError, Result};
use crate::utils::{RetryConfig, retry_if, validate_http_url};

/// 推送单个链接到搜索引擎
#[async_trait]
pub trait SeoNotifier: Send + Sync {
    async fn notify(&self, article_url: &str) -> Result<()>;
}

struct PushError {
    retryable: bool,
    error: BlogkeeperError,
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// 百度普通收录推送
pub struct BaiduPushNotifier {
    agent: Agent,
    endpoint: String,
    host: String,
    user_agent: String,
    retry_config: RetryConfig,
}

impl BaiduPushNotifier {
    pub fn new(config: &SeoConfig) -> Result<Self> {
        let endpoint = validate_http_url(&config.endpoint).map_err(|e| {
            BlogkeeperError::config(format!("Invalid seo.endpoint '{}': {}", config.endpoint, e))
        })?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();

        debug!("SEO push endpoint: {} (host {})", endpoint, config.host);

        Ok(Self {
            agent,
            endpoint: endpoint.to_string(),
            host: config.host.clone(),
            user_agent: config.user_agent.clone(),
            retry_config: RetryConfig {
                max_retries: config.retry_count,
                base_delay_ms: config.retry_base_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
            },
        })
    }

    fn push_sync(
        agent: &Agent,
        endpoint: &str,
        host: &str,
        user_agent: &str,
        article_url: &str,
    ) -> std::result::Result<(), PushError> {
        let resp = agent
            .post(endpoint)
            .header("Host", host)
            .header("User-Agent", user_agent)
            .header("Content-Length", article_url.len().to_string())
            .header("Content-Type", "text/plain")
            .send(article_url)
            .map_err(|e| PushError {
                retryable: true,
                error: BlogkeeperError::from(e),
            })?;

        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }

        let body = resp.into_body().read_to_string().unwrap_or_default();
        Err(PushError {
            retryable: status >= 500 || status == 429,
            error: BlogkeeperError::http_egress(format!(
                "push endpoint returned {}: {}",
                status,
                body.trim()
            )),
        })
    }
}

#[async_trait]
impl SeoNotifier for BaiduPushNotifier {
    async fn notify(&self, article_url: &str) -> Result<()> {
        let article_url: Arc<str> = Arc::from(article_url);

        retry_if(
            "seo push",
            self.retry_config,
            |e: &PushError| e.retryable,
            || {
                let agent = self.agent.clone();
                let endpoint = self.endpoint.clone();
                let host = self.host.clone();
                let user_agent = self.user_agent.clone();
                let article_url = article_url.clone();
                async move {
                    // ureq 是同步客户端
                    tokio::task::spawn_blocking(move || {
                        Self::push_sync(&agent, &endpoint, &host, &user_agent, &article_url)
                    })
                    .await
                    .map_err(|e| PushError {
                        retryable: false,
                        error: BlogkeeperError::http_egress(format!("push task failed: {}", e)),
                    })?
                }
            },
        )
        .await
        .map_err(|e| e.error)?;

        trace!("Pushed {}", article_url);
        Ok(())
    }
}
