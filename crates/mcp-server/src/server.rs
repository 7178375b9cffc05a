//! Main MCP server orchestration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;

use crate::protocol::RequestHandler;
use crate::transport::{HttpTransport, StdioTransport, TransportError};
use solana_rpc::ClusterClients;

/// Interface the HTTP transport listens on unless told otherwise
pub const DEFAULT_HTTP_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Server mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// stdio transport (for desktop MCP hosts)
    #[default]
    Stdio,
    /// HTTP transport
    Http { addr: SocketAddr },
}

/// MCP server
pub struct McpServer {
    handler: Arc<RequestHandler>,
    mode: ServerMode,
}

impl McpServer {
    /// Create a new MCP server over the given cluster clients
    pub fn new(clusters: ClusterClients) -> Self {
        Self {
            handler: Arc::new(RequestHandler::new(clusters)),
            mode: ServerMode::default(),
        }
    }

    /// Set the server mode
    pub fn with_mode(mut self, mode: ServerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Run the server until the transport closes
    pub async fn run(&self) -> Result<(), TransportError> {
        match self.mode {
            ServerMode::Stdio => {
                info!("Starting MCP server in stdio mode");
                StdioTransport::new(self.handler.clone()).run().await
            }
            ServerMode::Http { addr } => {
                info!("Starting MCP server in HTTP mode on {}", addr);
                HttpTransport::new(self.handler.clone(), addr).run().await
            }
        }
    }
}

