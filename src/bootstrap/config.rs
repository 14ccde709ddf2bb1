//! # Configuration Resolution / 配置解析
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Load `.env` into the process environment / 加载 `.env`
//! - ✅ Locate and read `config.toml` / 定位并读取配置文件
//! - ✅ Apply environment overrides / 应用环境变量覆盖
//! - ✅ Fill empty paths with data-dir defaults / 为空路径填充默认值
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic / 禁止验证逻辑**
//! - An empty backend URL is passed on as-is; `run_app` decides.
//! - 空的后端 URL 原样传递，由 `run_app` 决定。
//!
//! ## Environment / 环境变量
//!
//! | Variable | Meaning |
//! |---|---|
//! | `RV_CONFIG` | Path of the TOML file (default: `<data dir>/config.toml`) |
//! | `RV_BACKEND_URL` | Overrides `[backend] url` |
//! | `RV_ANON_KEY` | Overrides `[backend] anon_key` |

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use rv_core::AppConfig;
use rv_infra::config::load_config;
use rv_infra::fs::{app_data_dir, default_config_path};

pub const CONFIG_PATH_ENV: &str = "RV_CONFIG";
pub const BACKEND_URL_ENV: &str = "RV_BACKEND_URL";
pub const ANON_KEY_ENV: &str = "RV_ANON_KEY";

/// Resolve the configuration of this run.
/// 解析本次运行的配置。
///
/// A missing config file is not an error: the app then runs on defaults
/// plus environment overrides.
pub fn resolve_config() -> anyhow::Result<AppConfig> {
    // `.env` is optional.
    let _ = dotenvy::dotenv();

    let data_dir = app_data_dir()?;
    let config_path = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };

    let config = read_config_or_default(&config_path)?;
    let config = fill_path_defaults(config, &data_dir);
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

fn read_config_or_default(config_path: &Path) -> anyhow::Result<AppConfig> {
    if !config_path.exists() {
        debug!(path = %config_path.display(), "no config file, using defaults");
        return Ok(AppConfig::empty());
    }
    load_config(config_path)
        .with_context(|| format!("Invalid config at {}", config_path.display()))
}

/// Replace empty storage paths with the ones under `data_dir`.
pub fn fill_path_defaults(mut config: AppConfig, data_dir: &Path) -> AppConfig {
    let defaults = AppConfig::with_system_defaults(data_dir.to_path_buf());
    if config.session_file.as_os_str().is_empty() {
        config.session_file = defaults.session_file;
    }
    if config.logs_dir.as_os_str().is_empty() {
        config.logs_dir = defaults.logs_dir;
    }
    config
}

/// Apply `RV_BACKEND_URL` / `RV_ANON_KEY`. Empty variables are ignored.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(url) = non_empty(BACKEND_URL_ENV) {
        config.backend_url = url;
    }
    if let Some(key) = non_empty(ANON_KEY_ENV) {
        config.anon_key = key;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fill_path_defaults_only_touches_empty_paths() {
        let config = AppConfig {
            logs_dir: PathBuf::from("/custom/logs"),
            ..AppConfig::empty()
        };

        let filled = fill_path_defaults(config, Path::new("/data/rendezvous"));

        assert_eq!(
            filled.session_file,
            PathBuf::from("/data/rendezvous/session.json")
        );
        assert_eq!(filled.logs_dir, PathBuf::from("/custom/logs"));
    }

    #[test]
    fn test_env_overrides_win_over_file_values() {
        let env: HashMap<&str, &str> = [
            (BACKEND_URL_ENV, "https://env.example.co"),
            (ANON_KEY_ENV, "  "),
        ]
        .into_iter()
        .collect();
        let config = AppConfig {
            backend_url: "https://file.example.co".to_string(),
            anon_key: "file-key".to_string(),
            ..AppConfig::empty()
        };

        let config = apply_env_overrides(config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend_url, "https://env.example.co");
        assert_eq!(config.anon_key, "file-key");
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let config = read_config_or_default(Path::new("/nonexistent/rv/config.toml")).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_broken_config_file_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[backend").unwrap();

        let err = read_config_or_default(file.path()).unwrap_err();

        assert!(format!("{err:#}").contains("Invalid config"));
    }
}
