//! The RPC operations tool handlers depend on

use async_trait::async_trait;
use wallet_core::{Pubkey, Transaction};

use crate::error::RpcResult;
use crate::types::{
    AccountFilter, BlockhashInfo, ProgramAccount, SendOptions, SignatureInfo, SignatureStatus,
    TransactionRecord,
};

/// A Solana RPC endpoint
///
/// Implementations must be safe to share across concurrent tool calls.
#[async_trait]
pub trait RpcGateway: Send + Sync {
    /// Endpoint URL, for logging
    fn endpoint(&self) -> &str;

    /// Balance in lamports
    async fn get_balance(&self, address: &Pubkey) -> RpcResult<u64>;

    /// Up to `limit` most recent signatures involving `address`, newest first
    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> RpcResult<Vec<SignatureInfo>>;

    /// Full transaction record; `None` when the node no longer has it
    async fn get_transaction(&self, signature: &str) -> RpcResult<Option<TransactionRecord>>;

    /// Accounts owned by `program` that match every filter
    async fn get_program_accounts(
        &self,
        program: &Pubkey,
        filters: &[AccountFilter],
    ) -> RpcResult<Vec<ProgramAccount>>;

    async fn get_latest_blockhash(&self) -> RpcResult<BlockhashInfo>;

    /// Submit a signed transaction, returning its signature
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> RpcResult<String>;

    /// Status for each signature, in input order
    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> RpcResult<Vec<Option<SignatureStatus>>>;

    async fn get_block_height(&self) -> RpcResult<u64>;
}
