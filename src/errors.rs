use std::fmt;

#[derive(Debug, Clone)]
pub enum BlogkeeperError {
    CacheConnection(String),
    CacheOperation(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    SearchIndex(String),
    HttpEgress(String),
    Serialization(String),
    Validation(String),
    NotFound(String),
    Config(String),
    Timeout(String),
}

impl BlogkeeperError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            BlogkeeperError::CacheConnection(_) => "E001",
            BlogkeeperError::CacheOperation(_) => "E002",
            BlogkeeperError::DatabaseConfig(_) => "E003",
            BlogkeeperError::DatabaseConnection(_) => "E004",
            BlogkeeperError::DatabaseOperation(_) => "E005",
            BlogkeeperError::SearchIndex(_) => "E006",
            BlogkeeperError::HttpEgress(_) => "E007",
            BlogkeeperError::Serialization(_) => "E008",
            BlogkeeperError::Validation(_) => "E009",
            BlogkeeperError::NotFound(_) => "E010",
            BlogkeeperError::Config(_) => "E011",
            BlogkeeperError::Timeout(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            BlogkeeperError::CacheConnection(_) => "Cache Connection Error",
            BlogkeeperError::CacheOperation(_) => "Cache Operation Error",
            BlogkeeperError::DatabaseConfig(_) => "Database Configuration Error",
            BlogkeeperError::DatabaseConnection(_) => "Database Connection Error",
            BlogkeeperError::DatabaseOperation(_) => "Database Operation Error",
            BlogkeeperError::SearchIndex(_) => "Search Index Error",
            BlogkeeperError::HttpEgress(_) => "HTTP Egress Error",
            BlogkeeperError::Serialization(_) => "Serialization Error",
            BlogkeeperError::Validation(_) => "Validation Error",
            BlogkeeperError::NotFound(_) => "Resource Not Found",
            BlogkeeperError::Config(_) => "Configuration Error",
            BlogkeeperError::Timeout(_) => "Timeout",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            BlogkeeperError::CacheConnection(msg) => msg,
            BlogkeeperError::CacheOperation(msg) => msg,
            BlogkeeperError::DatabaseConfig(msg) => msg,
            BlogkeeperError::DatabaseConnection(msg) => msg,
            BlogkeeperError::DatabaseOperation(msg) => msg,
            BlogkeeperError::SearchIndex(msg) => msg,
            BlogkeeperError::HttpEgress(msg) => msg,
            BlogkeeperError::Serialization(msg) => msg,
            BlogkeeperError::Validation(msg) => msg,
            BlogkeeperError::NotFound(msg) => msg,
            BlogkeeperError::Config(msg) => msg,
            BlogkeeperError::Timeout(msg) => msg,
        }
    }

    /// 协作方不可用（缓存、数据库、索引、网络），任务应中止
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BlogkeeperError::CacheConnection(_)
                | BlogkeeperError::DatabaseConnection(_)
                | BlogkeeperError::SearchIndex(_)
                | BlogkeeperError::HttpEgress(_)
                | BlogkeeperError::Timeout(_)
        )
    }

    /// 格式化为彩色输出（用于终端）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于日志）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for BlogkeeperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for BlogkeeperError {}

// 便捷的构造函数
impl BlogkeeperError {
    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::CacheConnection(msg.into())
    }

    pub fn cache_operation<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::CacheOperation(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::DatabaseOperation(msg.into())
    }

    pub fn search_index<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::SearchIndex(msg.into())
    }

    pub fn http_egress<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::HttpEgress(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::NotFound(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::Config(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        BlogkeeperError::Timeout(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for BlogkeeperError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_) => {
                BlogkeeperError::DatabaseConnection(err.to_string())
            }
            other => BlogkeeperError::DatabaseOperation(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for BlogkeeperError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            BlogkeeperError::CacheConnection(err.to_string())
        } else {
            BlogkeeperError::CacheOperation(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BlogkeeperError {
    fn from(err: serde_json::Error) -> Self {
        BlogkeeperError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for BlogkeeperError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => BlogkeeperError::Timeout(err.to_string()),
            other => BlogkeeperError::HttpEgress(other.to_string()),
        }
    }
}

impl From<std::io::Error> for BlogkeeperError {
    fn from(err: std::io::Error) -> Self {
        BlogkeeperError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlogkeeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            BlogkeeperError::cache_connection("x"),
            BlogkeeperError::cache_operation("x"),
            BlogkeeperError::database_config("x"),
            BlogkeeperError::database_connection("x"),
            BlogkeeperError::database_operation("x"),
            BlogkeeperError::search_index("x"),
            BlogkeeperError::http_egress("x"),
            BlogkeeperError::serialization("x"),
            BlogkeeperError::validation("x"),
            BlogkeeperError::not_found("x"),
            BlogkeeperError::config("x"),
            BlogkeeperError::timeout("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_format_simple() {
        let err = BlogkeeperError::not_found("user 7");
        assert_eq!(err.format_simple(), "Resource Not Found: user 7");
        assert_eq!(err.to_string(), "Resource Not Found: user 7");
    }

    #[test]
    fn test_db_conn_error_is_unavailable() {
        let err: BlogkeeperError = sea_orm::DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "connection lost".to_string(),
        ))
        .into();
        assert!(err.is_unavailable());

        let err: BlogkeeperError = sea_orm::DbErr::RecordNotFound("gone".to_string()).into();
        assert!(!err.is_unavailable());
    }
}
