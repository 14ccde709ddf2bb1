//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (backend client, session file, clock)
//! - ✅ 创建 infra 层具体实现
//! - ✅ Inject all dependencies into App / 将所有依赖注入到 App
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! - Do not decide where a user should be routed; the guard does that.
//! - 不决定用户应该去哪个页面，由导航守卫决定。
//!
//! ## Architecture Principle / 架构原则
//!
//! > **This is the only place allowed to depend on rv-infra + rv-app simultaneously.**
//! > **这是唯一允许同时依赖 rv-infra 和 rv-app 的地方。**

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use rv_app::{App, AppDeps};
use rv_core::ports::NavigatorPort;
use rv_core::AppConfig;
use rv_infra::{BackendClient, BackendSettings, FileSessionStore, SystemClock};

pub const TOKEN_FILE_NAME: &str = "tokens.json";

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Backend client initialization failed: {0}")]
    BackendInit(String),

    #[error("Session restore failed: {0}")]
    SessionRestore(String),
}

/// Navigator for the headless shell: remembers and logs the current screen.
/// 无界面外壳使用的导航器：记录并输出当前页面。
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    current: RwLock<Option<String>>,
}

impl LoggingNavigator {
    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NavigatorPort for LoggingNavigator {
    fn replace(&self, path: &str) {
        info!(path, "navigate");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
    }
}

/// Build the app from configuration.
/// 根据配置构建应用。
///
/// Saved backend tokens are restored before the app starts, so that
/// `App::start` sees the previous session.
pub async fn wire_app(
    config: &AppConfig,
    navigator: Arc<dyn NavigatorPort>,
) -> WiringResult<App> {
    let clock = Arc::new(SystemClock);

    let token_file = config.session_file.with_file_name(TOKEN_FILE_NAME);
    let backend = BackendClient::new(
        BackendSettings::new(config.backend_url.clone(), config.anon_key.clone()),
        clock.clone(),
    )
    .map_err(|e| WiringError::BackendInit(format!("{e:#}")))?
    .with_token_file(token_file);

    backend
        .restore()
        .await
        .map_err(|e| WiringError::SessionRestore(format!("{e:#}")))?;

    let backend = Arc::new(backend);
    let deps = AppDeps {
        auth: backend.clone(),
        profiles: backend.clone(),
        preferences: backend.clone(),
        posts: backend,
        session_store: Arc::new(FileSessionStore::new(config.session_file.clone())),
        navigator,
        clock,
    };

    Ok(App::new(deps, config))
}
