use serde::{Deserialize, Serialize};

/// 默认管理员角色 ID（导入接口资源时自动授权）
pub const DEFAULT_ADMIN_ROLE_ID: i32 = 1;

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - website: 站点公开地址
/// - database: 数据库连接配置
/// - cache: 缓存系统配置
/// - search: 搜索索引配置
/// - seo: 搜索引擎推送配置
/// - geoip: IP 归属地解析配置
/// - jobs / job_log / resources: 任务参数
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub website: WebsiteConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub seo: SeoConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub job_log: JobLogConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：BK，分隔符：__
    /// 示例：BK__DATABASE__DATABASE_URL=sqlite://blog.db
    pub fn load(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 BK，分隔符 __
            .add_source(
                Environment::with_prefix("BK")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// 返回遮蔽了凭据的副本，用于展示
    ///
    /// 连接 URL 中的密码、查询参数里的 token 以及搜索服务密码会被替换为 `****`
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.database.database_url = redact_url(&config.database.database_url);
        config.cache.redis.url = redact_url(&config.cache.redis.url);
        config.search.url = redact_url(&config.search.url);
        config.seo.endpoint = redact_url(&config.seo.endpoint);
        if config.search.password.is_some() {
            config.search.password = Some(REDACTED.to_string());
        }
        config
    }
}

const REDACTED: &str = "****";

/// 遮蔽 URL 里的密码和 token 查询参数，无法解析的 URL 原样返回
fn redact_url(raw: &str) -> String {
    let Ok(mut url) = url::Url::parse(raw) else {
        return raw.to_string();
    };
    if url.password().is_some() && url.set_password(Some(REDACTED)).is_err() {
        return raw.to_string();
    }
    let is_secret = |k: &str| k.eq_ignore_ascii_case("token") || k.eq_ignore_ascii_case("password");
    if url.query_pairs().any(|(k, _)| is_secret(&k)) {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if is_secret(&k) {
                    REDACTED.to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

/// 站点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfig {
    /// 站点公开地址，用于拼接文章链接：{url}/articles/{id}
    #[serde(default = "default_website_url")]
    pub url: String,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 单次操作超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 缓存系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// "redis" 或 "memory"
    #[serde(rename = "type")]
    #[serde(default = "default_cache_type")]
    pub cache_type: String,
    /// 单条命令超时（毫秒）
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub keys: CacheKeysConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 任务读写的缓存 key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheKeysConfig {
    /// 当日独立访客集合
    #[serde(default = "default_unique_visitor_key")]
    pub unique_visitor: String,
    /// 游客地域分布
    #[serde(default = "default_visitor_area_key")]
    pub visitor_area: String,
    /// 用户地域分布统计结果
    #[serde(default = "default_user_area_key")]
    pub user_area: String,
    /// 邮箱验证码前缀，完整 key 为 {prefix}{email}
    #[serde(default = "default_user_code_key")]
    pub user_code_prefix: String,
}

/// 搜索索引配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// "elasticsearch" 或 "memory"
    #[serde(default = "default_search_backend")]
    pub backend: String,
    #[serde(default = "default_search_url")]
    pub url: String,
    #[serde(default = "default_search_index")]
    pub index: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// 重建索引时每批写入的文章数
    #[serde(default = "default_search_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_http_retry_count")]
    pub retry_count: u32,
}

/// 搜索引擎推送配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoConfig {
    #[serde(default = "default_seo_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_seo_host")]
    pub host: String,
    #[serde(default = "default_seo_user_agent")]
    pub user_agent: String,
    /// 并发推送数上限
    #[serde(default = "default_seo_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_http_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// IP 归属地解析配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeoIpConfig {
    /// MaxMindDB 文件路径 (GeoLite2-City.mmdb)
    /// 仅用于 ip_source 中存放的是原始 IP 地址的情况
    #[serde(default)]
    pub maxminddb_path: Option<String>,
}

/// 任务通用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// 管理员角色 ID，导入资源后自动授权给该角色
    #[serde(default = "default_admin_role_id")]
    pub admin_role_id: i32,
    /// 用户表分页扫描大小
    #[serde(default = "default_scan_page_size")]
    pub scan_page_size: u64,
    /// 任务分组名（写入 job_logs.job_group）
    #[serde(default = "default_job_group")]
    pub group: String,
}

/// 任务日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLogConfig {
    /// 保留天数，0 表示清理全部
    #[serde(default = "default_job_log_retention_days")]
    pub retention_days: u64,
    #[serde(default = "default_job_log_batch_size")]
    pub batch_size: u64,
}

/// 接口资源导入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesConfig {
    /// Swagger / OpenAPI 文档地址
    #[serde(default = "default_api_docs_url")]
    pub api_docs_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_website_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_database_url() -> String {
    "blog.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_cache_type() -> String {
    "redis".to_string()
}

fn default_cache_timeout_ms() -> u64 {
    3000
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    String::new()
}

fn default_unique_visitor_key() -> String {
    "unique_visitor".to_string()
}

fn default_visitor_area_key() -> String {
    "visitor_area".to_string()
}

fn default_user_area_key() -> String {
    "user_area".to_string()
}

fn default_user_code_key() -> String {
    "code:".to_string()
}

fn default_search_backend() -> String {
    "elasticsearch".to_string()
}

fn default_search_url() -> String {
    "http://127.0.0.1:9200".to_string()
}

fn default_search_index() -> String {
    "article".to_string()
}

fn default_search_batch_size() -> u64 {
    200
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_http_retry_count() -> u32 {
    2
}

fn default_seo_endpoint() -> String {
    "http://data.zz.baidu.com/urls".to_string()
}

fn default_seo_host() -> String {
    "data.zz.baidu.com".to_string()
}

fn default_seo_user_agent() -> String {
    "curl/7.12.1".to_string()
}

fn default_seo_concurrency() -> usize {
    4
}

fn default_admin_role_id() -> i32 {
    DEFAULT_ADMIN_ROLE_ID
}

fn default_scan_page_size() -> u64 {
    1000
}

fn default_job_group() -> String {
    "DEFAULT".to_string()
}

fn default_job_log_retention_days() -> u64 {
    30
}

fn default_job_log_batch_size() -> u64 {
    5000
}

fn default_api_docs_url() -> String {
    "http://127.0.0.1:8080/v2/api-docs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            url: default_website_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: default_cache_type(),
            timeout_ms: default_cache_timeout_ms(),
            redis: RedisConfig::default(),
            keys: CacheKeysConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for CacheKeysConfig {
    fn default() -> Self {
        Self {
            unique_visitor: default_unique_visitor_key(),
            visitor_area: default_visitor_area_key(),
            user_area: default_user_area_key(),
            user_code_prefix: default_user_code_key(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: default_search_backend(),
            url: default_search_url(),
            index: default_search_index(),
            username: None,
            password: None,
            batch_size: default_search_batch_size(),
            timeout_secs: default_http_timeout_secs(),
            retry_count: default_http_retry_count(),
        }
    }
}

impl Default for SeoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_seo_endpoint(),
            host: default_seo_host(),
            user_agent: default_seo_user_agent(),
            concurrency: default_seo_concurrency(),
            timeout_secs: default_http_timeout_secs(),
            retry_count: default_http_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            admin_role_id: default_admin_role_id(),
            scan_page_size: default_scan_page_size(),
            group: default_job_group(),
        }
    }
}

impl Default for JobLogConfig {
    fn default() -> Self {
        Self {
            retention_days: default_job_log_retention_days(),
            batch_size: default_job_log_batch_size(),
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            api_docs_url: default_api_docs_url(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.jobs.admin_role_id, DEFAULT_ADMIN_ROLE_ID);
        assert_eq!(config.cache.keys.unique_visitor, "unique_visitor");
        assert_eq!(config.search.index, "article");
        assert_eq!(config.seo.host, "data.zz.baidu.com");
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[website]"));
        assert!(sample.contains("[cache.keys]"));

        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.search.batch_size, default_search_batch_size());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [website]
            url = "https://blog.example.com"

            [jobs]
            admin_role_id = 3
            "#,
        )
        .unwrap();

        assert_eq!(parsed.website.url, "https://blog.example.com");
        assert_eq!(parsed.jobs.admin_role_id, 3);
        assert_eq!(parsed.jobs.scan_page_size, 1000);
        assert_eq!(parsed.cache.cache_type, "redis");
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let mut config = StaticConfig::default();
        config.database.database_url = "mysql://blog:s3cret@db:3306/blog".to_string();
        config.cache.redis.url = "redis://:hunter2@cache:6379/0".to_string();
        config.search.password = Some("elastic-pw".to_string());
        config.seo.endpoint =
            "http://data.zz.baidu.com/urls?site=https://blog.example.com&token=abc123".to_string();

        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        for secret in ["s3cret", "hunter2", "elastic-pw", "abc123"] {
            assert!(!shown.contains(secret), "{} leaked", secret);
        }
        assert!(shown.contains("mysql://blog:****@db:3306/blog"));
        assert!(shown.contains("site="));

        // 原配置不受影响
        assert_eq!(config.search.password.as_deref(), Some("elastic-pw"));
    }

    #[test]
    fn test_redact_url_without_credentials_is_unchanged() {
        assert_eq!(
            redact_url("sqlite://blogkeeper.db?mode=rwc"),
            "sqlite://blogkeeper.db?mode=rwc"
        );
        assert_eq!(redact_url("not a url"), "not a url");
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        StaticConfig::default().save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("database_url"));
    }
}
