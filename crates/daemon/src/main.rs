//! Droidlink - Main Entry Point
//! Device session daemon: JSON-RPC server over the Android bridge tool

mod config;
mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, info_span, warn};

// Import workspace crates
use config::DaemonConfig;
use droidlink_api_rpc::{RateLimiter, RpcHandler, RpcServer, RpcServerConfig};
use droidlink_core::application::{SessionOrchestrator, ToolPaths};
use droidlink_core::port::time_provider::SystemTimeProvider;
use droidlink_infra_system::{BridgeTool, SubprocessExecutor, ToolLocator};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging (guard flushes the log file on exit)
    let _log_guard = logging::init(&config)?;

    info!("Droidlink v{} starting...", VERSION);

    // 3. Locate external tools
    let locator = ToolLocator::new(Some(&config.tools_dir));
    let bridge = locator
        .locate(BridgeTool::Adb, config.adb_path.as_deref())
        .context("The Android bridge tool is required")?;
    let mirror = match locator.locate(BridgeTool::Scrcpy, config.scrcpy_path.as_deref()) {
        Ok(path) => Some(path),
        Err(e) => {
            warn!(error = %e, "Screen mirroring disabled");
            None
        }
    };
    let signing_key = locator.signing_key(&config.signing_key);
    info!(
        bridge = %bridge,
        mirror = ?mirror,
        signing_key_present = signing_key.is_some(),
        "Tools resolved"
    );

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let executor = Arc::new(SubprocessExecutor::new(time_provider.clone()));
    let orchestrator = Arc::new(
        SessionOrchestrator::new(executor, ToolPaths { bridge, mirror }, time_provider)
            .with_capture_dir(config.capture_dir.clone())
            .with_span(info_span!("session")),
    );

    // 5. Warm the registry
    let devices = orchestrator.discover().await;
    info!(devices = devices.len(), "Initial discovery completed");

    // 6. Start JSON-RPC server
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_burst,
        config.rate_limit_rate,
    ));
    let handler = RpcHandler::new(orchestrator, rate_limiter, signing_key);
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let rpc_handle = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown; mirroring processes are left running
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
