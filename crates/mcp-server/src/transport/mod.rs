//! Transport implementations for MCP server

mod http;
mod stdio;

pub use http::{router, HttpTransport};
pub use stdio::StdioTransport;

use thiserror::Error;

/// Transport failures that end the server
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
