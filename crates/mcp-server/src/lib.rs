//! # mcp-server
//!
//! MCP (Model Context Protocol) server exposing Solana wallet tools.
//! Supports both stdio and HTTP transports.

pub mod protocol;
mod server;
pub mod tools;
pub mod transport;

pub use protocol::{McpError, McpMessage, RequestHandler, ServerCapabilities};
pub use server::{McpServer, ServerMode, DEFAULT_HTTP_HOST};
pub use tools::{ToolError, ToolExecutor, ToolRegistry};
pub use transport::{HttpTransport, StdioTransport, TransportError};
