//! # solana-rpc
//!
//! Solana JSON-RPC access for walletmcp:
//! - [`RpcGateway`], the operations tool handlers depend on
//! - [`HttpRpcClient`], the reqwest-backed implementation
//! - Submission with confirmation polling and blockhash expiry
//! - Instruction extraction from fetched transactions

pub mod client;
pub mod clusters;
pub mod confirm;
pub mod error;
pub mod gateway;
pub mod instructions;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::HttpRpcClient;
pub use clusters::ClusterClients;
pub use confirm::{send_and_confirm, ConfirmConfig};
pub use error::{RpcError, RpcResult};
pub use gateway::RpcGateway;
pub use instructions::extract_instructions;
pub use types::*;
