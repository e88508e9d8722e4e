//! # Statehook Server
//!
//! Standalone binary for the state-change webhook service.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin statehook-server
//!
//! # Run with specific environment
//! STATEHOOK_ENV=production cargo run --bin statehook-server
//! ```

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use statehook::bootstrap::ServiceBootstrap;
use statehook::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    info!("🚀 Starting Statehook Server...");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );

    let handle = ServiceBootstrap::bootstrap()
        .await
        .context("Failed to bootstrap service")?;

    info!("   Environment: {}", handle.environment);
    info!("   Press Ctrl+C to shutdown gracefully");

    if let Err(e) = handle.serve(shutdown_signal()).await {
        error!("Server stopped with error: {}", e);
        return Err(e.into());
    }

    info!("👋 Statehook Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }

    info!("🛑 Shutdown signal received, initiating graceful shutdown...");
}
