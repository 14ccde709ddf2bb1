use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "rendezvous";

/// Get the Rendezvous application data root directory.
///
/// 获取应用数据根目录。
///
/// # Platform-specific Paths / 平台特定路径
/// - macOS: ~/Library/Application Support/rendezvous
/// - Windows: %LOCALAPPDATA%\rendezvous
/// - Linux: $XDG_DATA_HOME/rendezvous or ~/.local/share/rendezvous
///
/// Does not create the directory; the caller decides when to.
/// 此函数不自动创建目录。
pub fn app_data_dir() -> Result<PathBuf> {
    let base_dir =
        dirs::data_local_dir().context("Failed to get platform-specific data directory")?;
    Ok(base_dir.join(APP_DIR_NAME))
}

/// Default location of the optional `config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("config.toml"))
}
