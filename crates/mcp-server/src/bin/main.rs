//! walletmcp server CLI
//!
//! Serves the Solana wallet tools to an MCP host. Logs go to stderr so the
//! stdio protocol stream on stdout stays clean.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::info;

use mcp_server::{McpServer, ServerMode, DEFAULT_HTTP_HOST};
use solana_rpc::ClusterClients;
use wallet_core::{Commitment, Settings};

/// walletmcp - Solana wallet tools over the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "wallet-mcp-server")]
#[command(version)]
#[command(about = "walletmcp - Solana wallet tools over MCP")]
struct Args {
    /// Run in stdio mode (default)
    #[arg(long)]
    stdio: bool,

    /// Run in HTTP mode
    #[arg(long, conflicts_with = "stdio")]
    http: bool,

    /// Address for HTTP server (loopback unless set)
    #[arg(long, env = "WALLET_MCP_HOST", default_value_t = DEFAULT_HTTP_HOST)]
    host: IpAddr,

    /// Port for HTTP server
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Settings file (defaults to settings.json in the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mainnet RPC endpoint
    #[arg(long, env = "WALLET_MCP_MAINNET_URL")]
    mainnet_url: Option<String>,

    /// Devnet RPC endpoint
    #[arg(long, env = "WALLET_MCP_DEVNET_URL")]
    devnet_url: Option<String>,

    /// Commitment for queries and confirmation (processed, confirmed, finalized)
    #[arg(long, env = "WALLET_MCP_COMMITMENT")]
    commitment: Option<Commitment>,
}

impl Args {
    fn mode(&self) -> ServerMode {
        if self.http {
            ServerMode::Http {
                addr: SocketAddr::new(self.host, self.port),
            }
        } else {
            ServerMode::Stdio
        }
    }

    /// File settings with command-line overrides applied
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load_default().context("Failed to load settings")?,
        };

        if let Some(url) = &self.mainnet_url {
            settings.mainnet_url = url.clone();
        }
        if let Some(url) = &self.devnet_url {
            settings.devnet_url = url.clone();
        }
        if let Some(commitment) = self.commitment {
            settings.commitment = commitment;
        }

        settings.validate().context("Invalid configuration")?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = args.settings()?;
    let clusters =
        ClusterClients::from_settings(&settings).context("Failed to create RPC clients")?;

    let mode = args.mode();
    if let ServerMode::Http { addr } = mode {
        info!("Starting MCP server on http://{}", addr);
    }

    McpServer::new(clusters)
        .with_mode(mode)
        .run()
        .await
        .context("MCP transport failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_host_defaults_to_loopback() {
        let args = Args::try_parse_from(["wallet-mcp-server", "--http", "--port", "4100"]).unwrap();

        match args.mode() {
            ServerMode::Http { addr } => {
                assert_eq!(addr.ip(), DEFAULT_HTTP_HOST);
                assert_eq!(addr.port(), 4100);
            }
            other => panic!("unexpected mode: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_host() {
        let args =
            Args::try_parse_from(["wallet-mcp-server", "--http", "--host", "0.0.0.0"]).unwrap();

        assert!(matches!(
            args.mode(),
            ServerMode::Http { addr } if addr.ip().is_unspecified()
        ));
    }
}
