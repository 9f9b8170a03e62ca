pub mod daemon;
pub mod init;
pub mod run;
pub mod validate;

use leetdigest_config::AppConfig;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The explicit `--config` path, else the default location.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

/// Load the config file with environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let path = config_path(path);
    AppConfig::load_with(&path, |key| std::env::var(key).ok())
        .map_err(|e| format!("Failed to load config: {e}").into())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub fn cancel_on_shutdown(token: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received");
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}
