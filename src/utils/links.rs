//! URL 工具
//!
//! 校验站点 / 推送地址，并拼接文章公开链接

use url::Url;

/// URL 验证错误
#[derive(Debug, PartialEq, Eq)]
pub enum UrlError {
    EmptyUrl,
    InvalidProtocol(String),
    InvalidFormat(String),
}

impl std::fmt::Display for UrlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlError {}

/// 校验 http(s) URL
pub fn validate_http_url(url: &str) -> Result<Url, UrlError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlError::EmptyUrl);
    }

    let parsed = Url::parse(url).map_err(|e| UrlError::InvalidFormat(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(UrlError::InvalidProtocol(format!("{}:", other))),
    }
}

/// 文章公开链接：{base}/articles/{id}
pub fn article_url(base: &str, article_id: i32) -> String {
    format!("{}/articles/{}", base.trim_end_matches('/'), article_id)
}
