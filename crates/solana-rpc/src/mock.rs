//! Scripted in-memory gateway for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use wallet_core::{Pubkey, Transaction};

use crate::error::{RpcError, RpcResult};
use crate::gateway::RpcGateway;
use crate::types::{
    AccountFilter, BlockhashInfo, ProgramAccount, SendOptions, SignatureInfo, SignatureStatus,
    TransactionRecord,
};

#[derive(Default)]
struct MockState {
    balances: HashMap<Pubkey, u64>,
    signatures: Vec<SignatureInfo>,
    transactions: HashMap<String, TransactionRecord>,
    failing_transactions: Vec<String>,
    program_accounts: Vec<ProgramAccount>,
    send_results: VecDeque<RpcResult<String>>,
    statuses: VecDeque<Option<SignatureStatus>>,
    block_height: u64,
    failures: HashMap<String, String>,
    calls: Vec<String>,
    sent: Vec<(Transaction, SendOptions)>,
    filters: Vec<Vec<AccountFilter>>,
    limits: Vec<usize>,
}

/// Gateway that answers from canned data and records every call
pub struct MockGateway {
    endpoint: String,
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut *self.lock());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_balance(self, address: Pubkey, lamports: u64) -> Self {
        self.with(|s| {
            s.balances.insert(address, lamports);
        })
    }

    pub fn with_signatures(self, signatures: Vec<SignatureInfo>) -> Self {
        self.with(|s| s.signatures = signatures)
    }

    pub fn with_transaction(self, signature: &str, record: TransactionRecord) -> Self {
        self.with(|s| {
            s.transactions.insert(signature.to_string(), record);
        })
    }

    /// Make `getTransaction` fail for one signature
    pub fn with_failing_transaction(self, signature: &str) -> Self {
        self.with(|s| s.failing_transactions.push(signature.to_string()))
    }

    pub fn with_program_accounts(self, accounts: Vec<ProgramAccount>) -> Self {
        self.with(|s| s.program_accounts = accounts)
    }

    /// Queue a result for the next `sendTransaction`
    pub fn with_send_result(self, result: RpcResult<String>) -> Self {
        self.with(|s| s.send_results.push_back(result))
    }

    /// Statuses returned by successive polls; the last one repeats
    pub fn with_statuses(self, statuses: Vec<Option<SignatureStatus>>) -> Self {
        self.with(|s| s.statuses = statuses.into())
    }

    pub fn with_block_height(self, height: u64) -> Self {
        self.with(|s| s.block_height = height)
    }

    /// Make every call to `method` fail with an RPC error
    pub fn with_failure(self, method: &str, message: &str) -> Self {
        self.with(|s| {
            s.failures.insert(method.to_string(), message.to_string());
        })
    }

    /// Methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Transactions submitted so far with their send options
    pub fn sent(&self) -> Vec<(Transaction, SendOptions)> {
        self.lock().sent.clone()
    }

    /// Filters passed to each `getProgramAccounts`
    pub fn filters(&self) -> Vec<Vec<AccountFilter>> {
        self.lock().filters.clone()
    }

    /// Limits passed to each `getSignaturesForAddress`
    pub fn limits(&self) -> Vec<usize> {
        self.lock().limits.clone()
    }

    fn record(&self, method: &str) -> RpcResult<()> {
        let mut state = self.lock();
        state.calls.push(method.to_string());
        match state.failures.get(method) {
            Some(message) => Err(RpcError::Rpc {
                code: -32000,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RpcGateway for MockGateway {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_balance(&self, address: &Pubkey) -> RpcResult<u64> {
        self.record("getBalance")?;
        Ok(self.lock().balances.get(address).copied().unwrap_or(0))
    }

    async fn get_signatures_for_address(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> RpcResult<Vec<SignatureInfo>> {
        self.record("getSignaturesForAddress")?;
        let mut state = self.lock();
        state.limits.push(limit);
        Ok(state.signatures.iter().take(limit).cloned().collect())
    }

    async fn get_transaction(&self, signature: &str) -> RpcResult<Option<TransactionRecord>> {
        self.record("getTransaction")?;
        let state = self.lock();
        if state.failing_transactions.iter().any(|s| s == signature) {
            return Err(RpcError::HttpError(format!("connection reset fetching {}", signature)));
        }
        Ok(state.transactions.get(signature).cloned())
    }

    async fn get_program_accounts(
        &self,
        _program: &Pubkey,
        filters: &[AccountFilter],
    ) -> RpcResult<Vec<ProgramAccount>> {
        self.record("getProgramAccounts")?;
        let mut state = self.lock();
        state.filters.push(filters.to_vec());
        Ok(state.program_accounts.clone())
    }

    async fn get_latest_blockhash(&self) -> RpcResult<BlockhashInfo> {
        self.record("getLatestBlockhash")?;
        Ok(BlockhashInfo {
            blockhash: "4uQeVj5tqViQh7yWWGStvkEG1Zmhx6uasJtWCJziofM".to_string(),
            last_valid_block_height: 1_000,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> RpcResult<String> {
        self.record("sendTransaction")?;
        let mut state = self.lock();
        state.sent.push((transaction.clone(), options));
        match state.send_results.pop_front() {
            Some(result) => result,
            None => Ok(transaction.signature().unwrap_or_default()),
        }
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> RpcResult<Vec<Option<SignatureStatus>>> {
        self.record("getSignatureStatuses")?;
        let mut state = self.lock();
        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front().flatten()
        } else {
            state.statuses.front().cloned().flatten()
        };
        Ok(signatures.iter().map(|_| status.clone()).collect())
    }

    async fn get_block_height(&self) -> RpcResult<u64> {
        self.record("getBlockHeight")?;
        Ok(self.lock().block_height)
    }
}
