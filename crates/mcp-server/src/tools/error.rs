//! Tool failures and their rendering into error envelopes

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::warn;
use wallet_core::SecretKeyBytes;

use crate::protocol::ToolCallResult;

/// Result type of every tool handler
pub type ToolResult = Result<ToolCallResult, ToolError>;

/// Marker that replaces secret material in error text
pub const REDACTED: &str = "[REDACTED]";

/// Where a tool call went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed address, key, or amount
    InvalidInput,
    /// Query against the cluster failed
    Rpc,
    /// Signing, submission, or confirmation failed
    Submission,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::Rpc => "rpc",
            ErrorKind::Submission => "submission",
        };
        write!(f, "{}", name)
    }
}

/// A failed tool call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InvalidInput, cause.to_string())
    }

    pub fn rpc(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Rpc, cause.to_string())
    }

    pub fn submission(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Submission, cause.to_string())
    }
}

/// Turn a handler result into the envelope sent to the host
///
/// Failures become a single `isError` item: `prefix` followed by the
/// scrubbed cause.
pub fn into_envelope(
    tool: &str,
    prefix: &str,
    result: ToolResult,
    secret: Option<&SecretKeyBytes>,
) -> ToolCallResult {
    match result {
        Ok(result) => result,
        Err(e) => {
            let text = redact(&format!("{}{}", prefix, e.message), secret);
            warn!("{} failed ({}): {}", tool, e.kind, text);
            ToolCallResult::error(text)
        }
    }
}

fn byte_list_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\[\s*\d{1,3}(?:\s*,\s*\d{1,3}){15,}\s*\]").ok())
        .as_ref()
}

/// Strip serialized key material from `text`
///
/// Replaces bracketed runs of 16 or more small integers and the base58 form
/// of `secret`.
pub fn redact(text: &str, secret: Option<&SecretKeyBytes>) -> String {
    let mut scrubbed = match byte_list_pattern() {
        Some(pattern) => pattern.replace_all(text, REDACTED).into_owned(),
        None => text.to_string(),
    };

    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        let encoded = bs58::encode(secret.expose()).into_string();
        scrubbed = scrubbed.replace(&encoded, REDACTED);
    }

    scrubbed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        let result = into_envelope("getBalance", "prefix: ", Ok(ToolCallResult::text("fine")), None);

        assert!(!result.is_error());
        assert_eq!(result.first_text(), "fine");
    }

    #[test]
    fn test_error_becomes_single_item() {
        let result = into_envelope(
            "listBuffers",
            "Error listing buffers: ",
            Err(ToolError::rpc("node unavailable")),
            None,
        );

        assert!(result.is_error());
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.first_text(), "Error listing buffers: node unavailable");
    }

    #[test]
    fn test_redacts_byte_lists() {
        let bytes: Vec<String> = (0..64).map(|i| (i * 3 % 256).to_string()).collect();
        let text = format!("bad key [{}] rejected", bytes.join(", "));

        assert_eq!(redact(&text, None), "bad key [REDACTED] rejected");
    }

    #[test]
    fn test_short_lists_survive() {
        let text = "InstructionError: [0, 1]";
        assert_eq!(redact(text, None), text);
    }

    #[test]
    fn test_redacts_base58_secret() {
        let secret = SecretKeyBytes::new((1..=64).collect());
        let encoded = bs58::encode(secret.expose()).into_string();
        let text = format!("signer {} unknown", encoded);

        let scrubbed = redact(&text, Some(&secret));
        assert_eq!(scrubbed, "signer [REDACTED] unknown");
    }
}
