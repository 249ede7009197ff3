pub mod retry;
pub mod links;

pub use retry::{RetryConfig, retry_if, retry_if_with_timeout};
pub use links::{UrlError, article_url, validate_http_url};
