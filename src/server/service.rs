use crate::catalog;
use crate::cli::ServeOpts;
use crate::config::{BindMode, Config};
use crate::server::routes::{self, AppState};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

/// The HTTP masking service.
pub struct MaskingServer {
    state: AppState,
    addr: SocketAddr,
}

impl MaskingServer {
    /// Build the catalog and resolve the listen address.
    pub fn start(config: Config, opts: &ServeOpts) -> Result<Self> {
        let port = opts.port.unwrap_or(config.server.port);
        let addr = resolve_bind_address(&config, opts.bind.as_deref(), port)?;

        let catalog =
            catalog::init(&config.masking).context("Failed to build strategy catalog")?;
        let state = AppState::new(catalog);

        info!("Masking server binding to {}", addr);
        Ok(Self { state, addr })
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let app = routes::build_routes(self.state.clone());

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        info!(
            "privops v{} listening on http://{}",
            self.state.version, self.addr
        );
        info!("  Health: http://{}/api/health", self.addr);
        info!("  Masking: http://{}/api/v1/masking", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Masking server shut down gracefully");
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
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
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Resolve the bind address from configuration and an optional override.
fn resolve_bind_address(
    config: &Config,
    bind_override: Option<&str>,
    port: u16,
) -> Result<SocketAddr> {
    let bind = match bind_override {
        Some(b) => b.parse().map_err(anyhow::Error::msg)?,
        None => config.server.bind,
    };

    let host = match bind {
        BindMode::Loopback => "127.0.0.1",
        BindMode::Lan => "0.0.0.0",
        BindMode::Custom => config
            .server
            .custom_bind_host
            .as_deref()
            .context("Custom bind mode requires server.customBindHost")?,
    };

    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))
}
