//! # Application Dependencies / 应用依赖
//!
//! Dependency grouping for App construction. Not a builder: every port is
//! required and there is no hidden logic.
//! 仅用于参数打包，所有依赖都是必需的。

use std::sync::Arc;

use rv_core::ports::*;

pub struct AppDeps {
    // Backend / 后端
    pub auth: Arc<dyn AuthPort>,
    pub profiles: Arc<dyn ProfileRepositoryPort>,
    pub preferences: Arc<dyn PreferencesRepositoryPort>,
    pub posts: Arc<dyn PostsPort>,

    // Local storage / 本地存储
    pub session_store: Arc<dyn SessionStorePort>,

    // UI / 界面
    pub navigator: Arc<dyn NavigatorPort>,

    // System / 系统
    pub clock: Arc<dyn ClockPort>,
}
