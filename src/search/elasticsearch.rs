//! Elasticsearch 搜索索引实现
//!
//! 通过 REST API 访问单个索引：
//! - `_delete_by_query` 删除全部文档
//! - `_doc/{id}` 写入单个文档
//! - `_bulk` 批量写入（NDJSON）
//! - `_count` 统计文档数
//!
//! ureq 是同步客户端，请求在 spawn_blocking 中执行。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::{ArticleSearchDto, SearchIndex};
use crate::config::SearchConfig;
use crate::errors::{BlogkeeperError, Result};
use crate::utils::{RetryConfig, retry_if, validate_http_url};

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Put,
    Post,
}

struct EsRequest {
    method: Method,
    url: String,
    content_type: &'static str,
    body: Option<String>,
}

struct EsResponse {
    status: u16,
    body: Value,
}

/// 单次请求的错误，附带是否值得重试
struct EsError {
    retryable: bool,
    error: BlogkeeperError,
}

impl fmt::Display for EsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

pub struct ElasticsearchIndex {
    agent: Agent,
    base_url: String,
    index: String,
    authorization: Option<String>,
    retry_config: RetryConfig,
}

impl ElasticsearchIndex {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let url = validate_http_url(&config.url).map_err(|e| {
            BlogkeeperError::config(format!("Invalid search.url '{}': {}", config.url, e))
        })?;
        if config.index.trim().is_empty() {
            return Err(BlogkeeperError::config("search.index must not be empty"));
        }

        // 非 2xx 状态码自行处理（例如索引不存在时的 404）
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();

        let authorization = match (&config.username, &config.password) {
            (Some(user), password) => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", user, password.as_deref().unwrap_or("")))
            )),
            (None, _) => None,
        };

        debug!(
            "Elasticsearch index '{}' at {} (auth: {})",
            config.index,
            url,
            authorization.is_some()
        );

        Ok(Self {
            agent,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            index: config.index.clone(),
            authorization,
            retry_config: RetryConfig {
                max_retries: config.retry_count,
                ..RetryConfig::default()
            },
        })
    }

    fn index_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.index, path)
    }

    /// 同步执行请求（在 spawn_blocking 中调用）
    fn execute_sync(
        agent: &Agent,
        authorization: Option<&str>,
        req: &EsRequest,
    ) -> std::result::Result<EsResponse, EsError> {
        let result = match req.method {
            Method::Get => {
                let mut builder = agent.get(&req.url);
                if let Some(auth) = authorization {
                    builder = builder.header("Authorization", auth);
                }
                builder.call()
            }
            Method::Put | Method::Post => {
                let mut builder = match req.method {
                    Method::Put => agent.put(&req.url),
                    _ => agent.post(&req.url),
                };
                if let Some(auth) = authorization {
                    builder = builder.header("Authorization", auth);
                }
                builder
                    .header("Content-Type", req.content_type)
                    .send(req.body.as_deref().unwrap_or(""))
            }
        };

        let resp = result.map_err(|e| EsError {
            // 网络层错误（连接失败、超时）都可以重试
            retryable: true,
            error: BlogkeeperError::from(e),
        })?;

        let status = resp.status().as_u16();
        let text = resp.into_body().read_to_string().map_err(|e| EsError {
            retryable: true,
            error: BlogkeeperError::from(e),
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| EsError {
                retryable: false,
                error: BlogkeeperError::serialization(format!(
                    "Invalid Elasticsearch response ({}): {}",
                    status, e
                )),
            })?
        };

        Ok(EsResponse { status, body })
    }

    /// 发送请求；404 交给调用方处理，其他非 2xx 视为错误，5xx/429 会重试
    async fn send(&self, name: &str, req: EsRequest) -> Result<EsResponse> {
        let req = std::sync::Arc::new(req);
        let op_name = format!("elasticsearch {}", name);

        retry_if(&op_name, self.retry_config, |e: &EsError| e.retryable, || {
            let agent = self.agent.clone();
            let auth = self.authorization.clone();
            let req = req.clone();
            async move {
                let response = tokio::task::spawn_blocking(move || {
                    Self::execute_sync(&agent, auth.as_deref(), &req)
                })
                .await
                .map_err(|e| EsError {
                    retryable: false,
                    error: BlogkeeperError::search_index(format!(
                        "Elasticsearch task failed: {}",
                        e
                    )),
                })??;

                match response.status {
                    200..=299 | 404 => Ok(response),
                    status => Err(EsError {
                        retryable: status >= 500 || status == 429,
                        error: BlogkeeperError::search_index(format!(
                            "Elasticsearch returned {}: {}",
                            status,
                            error_reason(&response.body)
                        )),
                    }),
                }
            }
        })
        .await
        .map_err(|e| e.error)
    }
}

/// 从错误响应中提取原因
fn error_reason(body: &Value) -> String {
    body.pointer("/error/reason")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| body.get("error").map(Value::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// 生成 `_bulk` 请求体，每个文档两行
fn bulk_body(index: &str, docs: &[ArticleSearchDto]) -> Result<String> {
    let mut body = String::new();
    for doc in docs {
        let action = json!({ "index": { "_index": index, "_id": doc.id.to_string() } });
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// 检查 `_bulk` 响应中的逐条结果，返回第一条失败
fn first_bulk_failure(body: &Value) -> Option<String> {
    if !body.get("errors").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    body.get("items")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("index"))
        .find(|op| op.get("error").is_some())
        .map(|op| {
            format!(
                "document {} failed: {}",
                op.get("_id").and_then(Value::as_str).unwrap_or("?"),
                error_reason(op)
            )
        })
        .or_else(|| Some("bulk request reported errors".to_string()))
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn delete_all(&self) -> Result<u64> {
        let req = EsRequest {
            method: Method::Post,
            url: self.index_url("_delete_by_query?refresh=true&conflicts=proceed"),
            content_type: "application/json",
            body: Some(json!({ "query": { "match_all": {} } }).to_string()),
        };
        let resp = self.send("delete_all", req).await?;

        if resp.status == 404 {
            warn!("Index '{}' does not exist, nothing to delete", self.index);
            return Ok(0);
        }
        let deleted = resp.body.get("deleted").and_then(Value::as_u64).unwrap_or(0);
        debug!("Deleted {} documents from '{}'", deleted, self.index);
        Ok(deleted)
    }

    async fn save(&self, doc: &ArticleSearchDto) -> Result<()> {
        let req = EsRequest {
            method: Method::Put,
            url: self.index_url(&format!("_doc/{}?refresh=true", doc.id)),
            content_type: "application/json",
            body: Some(serde_json::to_string(doc)?),
        };
        let resp = self.send("save", req).await?;
        if resp.status == 404 {
            return Err(BlogkeeperError::search_index(format!(
                "Index '{}' not found while saving document {}",
                self.index, doc.id
            )));
        }
        trace!("Saved document {}", doc.id);
        Ok(())
    }

    async fn save_batch(&self, docs: &[ArticleSearchDto]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }

        let req = EsRequest {
            method: Method::Post,
            url: format!("{}/_bulk?refresh=true", self.base_url),
            content_type: "application/x-ndjson",
            body: Some(bulk_body(&self.index, docs)?),
        };
        let resp = self.send("bulk", req).await?;

        if resp.status == 404 {
            return Err(BlogkeeperError::search_index("Bulk endpoint not found"));
        }
        if let Some(failure) = first_bulk_failure(&resp.body) {
            return Err(BlogkeeperError::search_index(failure));
        }
        debug!("Bulk indexed {} documents into '{}'", docs.len(), self.index);
        Ok(docs.len())
    }

    async fn count(&self) -> Result<u64> {
        let req = EsRequest {
            method: Method::Get,
            url: self.index_url("_count"),
            content_type: "application/json",
            body: None,
        };
        let resp = self.send("count", req).await?;
        if resp.status == 404 {
            return Ok(0);
        }
        resp.body
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| BlogkeeperError::search_index("Missing 'count' in _count response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i32, title: &str) -> ArticleSearchDto {
        ArticleSearchDto {
            id,
            article_title: title.to_string(),
            article_content: "content".to_string(),
            is_delete: 0,
            status: 1,
        }
    }

    #[test]
    fn test_bulk_body_is_ndjson() {
        let body = bulk_body("article", &[doc(1, "a"), doc(2, "b")]).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));

        let action: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(action["index"]["_index"], "article");
        assert_eq!(action["index"]["_id"], "2");
        let source: Value = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(source["articleTitle"], "b");
    }

    #[test]
    fn test_first_bulk_failure() {
        let ok = json!({ "errors": false, "items": [] });
        assert_eq!(first_bulk_failure(&ok), None);

        let failed = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                { "index": { "_id": "2", "status": 400, "error": { "reason": "mapper_parsing_exception" } } }
            ]
        });
        let msg = first_bulk_failure(&failed).unwrap();
        assert!(msg.contains("document 2"));
        assert!(msg.contains("mapper_parsing_exception"));
    }

    #[test]
    fn test_basic_auth_header() {
        let config = SearchConfig {
            username: Some("elastic".to_string()),
            password: Some("changeme".to_string()),
            ..SearchConfig::default()
        };
        let index = ElasticsearchIndex::new(&config).unwrap();
        assert_eq!(
            index.authorization.as_deref(),
            Some("Basic ZWxhc3RpYzpjaGFuZ2VtZQ==")
        );
    }

    #[test]
    fn test_rejects_invalid_url() {
        let config = SearchConfig {
            url: "not a url".to_string(),
            ..SearchConfig::default()
        };
        assert!(ElasticsearchIndex::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = SearchConfig {
            url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            retry_count: 0,
            ..SearchConfig::default()
        };
        let index = ElasticsearchIndex::new(&config).unwrap();
        let err = index.count().await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
