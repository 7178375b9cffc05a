//! Wallet tools: registry, handlers, and dispatch

mod error;
mod executor;
pub mod handlers;
pub mod registry;

pub use error::{into_envelope, redact, ErrorKind, ToolError, ToolResult, REDACTED};
pub use executor::ToolExecutor;
pub use registry::ToolRegistry;
