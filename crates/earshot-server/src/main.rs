//! # earshot
//!
//! Earshot audio analysis server binary: wires the sidecar-backed stages
//! together and starts the HTTP server.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use earshot_server::{Config, EarshotServer};

/// Earshot audio analysis server.
#[derive(Parser, Debug)]
#[command(name = "earshot", about = "Audio analysis server")]
struct Cli {
    /// Host to bind (overrides EARSHOT_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides EARSHOT_PORT).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let bind_addr = format!("{}:{}", config.host, config.port);
    let server = EarshotServer::from_config(config);
    let router = server.router();

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    let addr = listener.local_addr().context("failed to read bound addr")?;
    tracing::info!("earshot listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["earshot"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["earshot", "--host", "127.0.0.1", "--port", "9000"]);
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9000));
    }
}
