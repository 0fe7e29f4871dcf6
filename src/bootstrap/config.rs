//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - ✅ Apply environment overrides / 应用环境变量覆盖
//!
//! Missing sections and keys take the defaults carried by `AppConfig`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use aurora_core::config::AppConfig;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "aurora-alert.toml";

/// Overrides `[api] base_url`.
pub const API_BASE_URL_ENV: &str = "AURORA_API_BASE_URL";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML for
/// `AppConfig`.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one, `aurora-alert.toml` in the
/// working directory is used when present and defaults otherwise.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match explicit {
        Some(path) => load_config(&path)?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.exists() {
                load_config(&path)?
            } else {
                AppConfig::default()
            }
        }
    };
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    if let Some(base_url) = lookup(API_BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
        config.api.base_url = base_url;
    }
    config
}
