//! 接口资源导入
//!
//! 从 Swagger / OpenAPI 文档生成资源：每个 tag 一个模块资源，
//! 每个 path + method 一个接口资源，父级为其第一个 tag 对应的模块。
//! 写入按名称（模块）或 url + method（接口）匹配已有资源，重复导入只会更新。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::config::ResourcesConfig;
use crate::errors::{BlogkeeperError, Result};
use crate::storage::{NewResource, ResourceRecord, ResourceStore};
use crate::utils::validate_http_url;

/// 路径参数 `{id}`
static PATH_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^/{}]*\}").expect("path parameter pattern is valid"));

const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

/// API 文档来源
#[async_trait]
pub trait ApiDocSource: Send + Sync {
    async fn fetch(&self) -> Result<Value>;
}

/// 通过 HTTP 获取 API 文档
pub struct HttpApiDocSource {
    agent: Agent,
    url: String,
}

impl HttpApiDocSource {
    pub fn new(config: &ResourcesConfig) -> Result<Self> {
        let url = validate_http_url(&config.api_docs_url).map_err(|e| {
            BlogkeeperError::config(format!(
                "Invalid resources.api_docs_url '{}': {}",
                config.api_docs_url, e
            ))
        })?;
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .build()
            .into();
        Ok(Self {
            agent,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ApiDocSource for HttpApiDocSource {
    async fn fetch(&self) -> Result<Value> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        debug!("Fetching API docs from {}", url);

        tokio::task::spawn_blocking(move || -> Result<Value> {
            let resp = agent.get(&url).call()?;
            let doc: Value = resp.into_body().read_json()?;
            Ok(doc)
        })
        .await
        .map_err(|e| BlogkeeperError::http_egress(format!("API docs task failed: {}", e)))?
    }
}

/// 文档中的一个接口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: String,
    pub url: String,
    pub method: String,
    pub module: Option<String>,
}

/// 从文档解析出的模块与接口
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiCatalog {
    pub modules: Vec<String>,
    pub endpoints: Vec<EndpointSpec>,
}

/// `/articles/{articleId}/like` → `/articles/*/like`
pub fn normalize_path(path: &str) -> String {
    PATH_PARAM.replace_all(path, "*").into_owned()
}

/// 解析 Swagger 2 / OpenAPI 3 文档
pub fn parse_api_doc(doc: &Value) -> Result<ApiCatalog> {
    let paths = doc
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| BlogkeeperError::validation("API docs have no 'paths' object"))?;

    let mut catalog = ApiCatalog::default();

    for tag in doc.get("tags").and_then(Value::as_array).into_iter().flatten() {
        if let Some(name) = tag.get("name").and_then(Value::as_str)
            && !catalog.modules.iter().any(|m| m == name)
        {
            catalog.modules.push(name.to_string());
        }
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (path, item) in paths {
        let Some(operations) = item.as_object() else {
            continue;
        };
        let url = normalize_path(path);

        for method in HTTP_METHODS {
            let Some(op) = operations.get(method) else {
                continue;
            };
            let method = method.to_uppercase();
            let module = op
                .get("tags")
                .and_then(Value::as_array)
                .and_then(|tags| tags.first())
                .and_then(Value::as_str)
                .map(String::from);
            let name = op
                .get("summary")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .or_else(|| op.get("operationId").and_then(Value::as_str))
                .map(String::from)
                .unwrap_or_else(|| format!("{} {}", method, url));

            // 文档里未声明的 tag 也要有模块
            if let Some(ref m) = module
                && !catalog.modules.iter().any(|existing| existing == m)
            {
                catalog.modules.push(m.clone());
            }

            if !seen.insert((url.clone(), method.clone())) {
                warn!("Duplicate endpoint {} {} in API docs, keeping first", method, url);
                continue;
            }
            catalog.endpoints.push(EndpointSpec {
                name,
                url: url.clone(),
                method,
                module,
            });
        }
    }

    Ok(catalog)
}

/// 导入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub modules: usize,
    pub endpoints: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ImportSummary {
    pub fn imported(&self) -> usize {
        self.modules + self.endpoints
    }
}

/// 资源导入器
#[async_trait]
pub trait ResourceImporter: Send + Sync {
    /// 导入并持久化全部资源；返回后资源已写入存储
    async fn import_resources(&self) -> Result<ImportSummary>;
}

pub struct SwaggerResourceImporter {
    source: Arc<dyn ApiDocSource>,
    store: Arc<dyn ResourceStore>,
}

impl SwaggerResourceImporter {
    pub fn new(source: Arc<dyn ApiDocSource>, store: Arc<dyn ResourceStore>) -> Self {
        Self { source, store }
    }

    async fn upsert_modules(
        &self,
        catalog: &ApiCatalog,
        existing: &[ResourceRecord],
        summary: &mut ImportSummary,
    ) -> Result<HashMap<String, i32>> {
        let mut module_ids: HashMap<String, i32> = existing
            .iter()
            .filter(|r| r.is_module())
            .map(|r| (r.resource_name.clone(), r.id))
            .collect();

        for name in &catalog.modules {
            if module_ids.contains_key(name) {
                summary.unchanged += 1;
                continue;
            }
            let id = self.store.insert_resource(&NewResource::module(name)).await?;
            module_ids.insert(name.clone(), id);
            summary.created += 1;
        }
        summary.modules = catalog.modules.len();
        Ok(module_ids)
    }

    async fn upsert_endpoints(
        &self,
        catalog: &ApiCatalog,
        existing: &[ResourceRecord],
        module_ids: &HashMap<String, i32>,
        summary: &mut ImportSummary,
    ) -> Result<()> {
        let by_key: BTreeMap<(&str, &str), &ResourceRecord> = existing
            .iter()
            .filter_map(|r| match (r.url.as_deref(), r.request_method.as_deref()) {
                (Some(url), Some(method)) => Some(((url, method), r)),
                _ => None,
            })
            .collect();

        for endpoint in &catalog.endpoints {
            let parent_id = endpoint
                .module
                .as_ref()
                .and_then(|m| module_ids.get(m).copied());
            let resource = NewResource {
                resource_name: endpoint.name.clone(),
                url: Some(endpoint.url.clone()),
                request_method: Some(endpoint.method.clone()),
                parent_id,
                is_anonymous: false,
            };

            match by_key.get(&(endpoint.url.as_str(), endpoint.method.as_str())) {
                Some(current)
                    if current.resource_name == resource.resource_name
                        && current.parent_id == resource.parent_id =>
                {
                    summary.unchanged += 1;
                }
                Some(current) => {
                    self.store.update_resource(current.id, &resource).await?;
                    summary.updated += 1;
                }
                None => {
                    self.store.insert_resource(&resource).await?;
                    summary.created += 1;
                }
            }
        }
        summary.endpoints = catalog.endpoints.len();
        Ok(())
    }
}

#[async_trait]
impl ResourceImporter for SwaggerResourceImporter {
    async fn import_resources(&self) -> Result<ImportSummary> {
        let doc = self.source.fetch().await?;
        let catalog = parse_api_doc(&doc)?;
        let existing = self.store.list_resources().await?;

        let mut summary = ImportSummary::default();
        let module_ids = self
            .upsert_modules(&catalog, &existing, &mut summary)
            .await?;
        self.upsert_endpoints(&catalog, &existing, &module_ids, &mut summary)
            .await?;

        info!(
            "Imported {} modules and {} endpoints ({} created, {} updated, {} unchanged)",
            summary.modules, summary.endpoints, summary.created, summary.updated, summary.unchanged
        );
        Ok(summary)
    }
}
