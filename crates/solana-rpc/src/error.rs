//! Error types for the RPC gateway

use thiserror::Error;
use wallet_core::WalletError;

/// Result type alias for RPC operations
pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected RPC response: {0}")]
    UnexpectedResponse(String),

    #[error("Transaction {signature} failed: {error}")]
    TransactionFailed { signature: String, error: String },

    #[error("Blockhash expired before transaction {0} was confirmed")]
    BlockhashExpired(String),

    #[error("Transaction {signature} was not confirmed within {seconds}s")]
    ConfirmationTimeout { signature: String, seconds: u64 },

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        RpcError::HttpError(e.to_string())
    }
}
