//! stdio transport for MCP (newline-delimited JSON-RPC)

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use super::TransportError;
use crate::protocol::{McpError, McpMessage, RequestHandler};

/// stdio transport for MCP protocol
///
/// Messages are handled one at a time; the next line is read only after
/// the previous response has been written.
pub struct StdioTransport {
    handler: Arc<RequestHandler>,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Serve stdin/stdout until EOF
    pub async fn run(&self) -> Result<(), TransportError> {
        info!("Starting MCP server on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve any line-oriented stream pair until EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), TransportError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        loop {
            line.clear();

            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<McpMessage>(line) {
                Ok(message) => {
                    debug!("Received {:?}", message.method);
                    self.handler.handle(message).await
                }
                Err(e) => {
                    error!("Failed to parse message: {}", e);
                    Some(McpMessage::error_response(
                        Some(Value::Null),
                        McpError::parse_error(),
                    ))
                }
            };

            if let Some(response) = response {
                let response_line = serde_json::to_string(&response)?;
                writer.write_all(response_line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }
}
