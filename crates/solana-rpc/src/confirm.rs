//! Submit a transaction and wait for it to land

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use wallet_core::{Commitment, Settings, Transaction};

use crate::error::{RpcError, RpcResult};
use crate::gateway::RpcGateway;
use crate::types::SendOptions;

/// How long and how hard to wait for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmConfig {
    pub commitment: Commitment,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl ConfirmConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            commitment: settings.commitment,
            timeout: settings.confirm_timeout(),
            poll_interval: settings.confirm_poll_interval(),
        }
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Send `transaction` and poll until it reaches the configured commitment
///
/// Stops with an error when the transaction fails on chain, when the block
/// height passes `last_valid_block_height`, or when the timeout elapses.
/// Never resubmits.
pub async fn send_and_confirm(
    gateway: &dyn RpcGateway,
    transaction: &Transaction,
    last_valid_block_height: u64,
    options: SendOptions,
    config: &ConfirmConfig,
) -> RpcResult<String> {
    let signature = gateway.send_transaction(transaction, options).await?;
    info!("Submitted transaction {} to {}", signature, gateway.endpoint());

    let deadline = Instant::now() + config.timeout;
    let query = [signature.clone()];

    loop {
        let statuses = gateway.get_signature_statuses(&query).await?;

        if let Some(Some(status)) = statuses.into_iter().next() {
            if let Some(err) = status.err {
                warn!("Transaction {} failed: {}", signature, err);
                return Err(RpcError::TransactionFailed {
                    signature,
                    error: err.to_string(),
                });
            }
            if status.commitment() >= config.commitment {
                info!("Transaction {} reached {}", signature, config.commitment);
                return Ok(signature);
            }
            debug!("Transaction {} at {}", signature, status.commitment());
        }

        let block_height = gateway.get_block_height().await?;
        if block_height > last_valid_block_height {
            return Err(RpcError::BlockhashExpired(signature));
        }

        if Instant::now() >= deadline {
            return Err(RpcError::ConfirmationTimeout {
                signature,
                seconds: config.timeout.as_secs(),
            });
        }

        sleep(config.poll_interval).await;
    }
}
