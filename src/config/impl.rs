use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" when `None`).
/// If the file doesn't exist, uses in-memory defaults.
///
/// # Examples
/// ```no_run
/// use blogkeeper::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}
