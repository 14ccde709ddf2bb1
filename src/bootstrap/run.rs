use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use rv_core::ports::NavigatorPort;
use rv_core::{AppConfig, GuardDecision};

use super::wiring::{wire_app, LoggingNavigator};

/// Create the multi-threaded tokio runtime the app runs on.
pub fn create_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("rendezvous")
        .build()
        .context("Failed to build tokio runtime")
}

/// Run the headless shell until Ctrl-C.
///
/// Starts the app, routes the home screen once through the navigation guard
/// and keeps following session changes until interrupted.
pub async fn run_app(config: AppConfig) -> anyhow::Result<()> {
    if config.backend_url.is_empty() {
        anyhow::bail!("No backend URL configured: set [backend] url or RV_BACKEND_URL");
    }
    if config.anon_key.is_empty() {
        warn!("no anon key configured, requests will likely be rejected");
    }

    let navigator = Arc::new(LoggingNavigator::default());
    let app = wire_app(&config, navigator.clone())
        .await
        .context("Failed to wire app")?;
    app.start().await;

    let home = config.routes.home.as_str();
    match app.guard().render(home) {
        GuardDecision::Allow => navigator.replace(home),
        GuardDecision::ShowError(prompt) => {
            warn!(?prompt, "records failed to load, retrying once");
            app.guard().retry(home).await;
        }
        decision => info!(?decision, "initial route"),
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    app.shutdown();
    Ok(())
}
