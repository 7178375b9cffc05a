//! The wallet tools
//!
//! Every handler validates its input, talks to the cluster through
//! [`ClusterClients`], and shapes the outcome into a [`ToolCallResult`].
//! Handlers never retry; the two submitting tools send exactly once.

use futures::future::try_join_all;
use serde::Deserialize;
use tracing::{debug, info};
use wallet_core::programs::{
    self, BPF_LOADER_UPGRADEABLE_ID, BUFFER_ACCOUNT_SIZE, BUFFER_AUTHORITY_OFFSET,
};
use wallet_core::{Hash, Keypair, Message, Network, Pubkey, SecretKeyBytes, Transaction};

use solana_rpc::{
    extract_instructions, send_and_confirm, AccountFilter, BlockhashInfo, ClusterClients, Memcmp,
    SendOptions,
};

use super::error::{ToolError, ToolResult};
use super::registry::DEFAULT_LOG_LIMIT;
use crate::protocol::{ToolCallResult, ToolContent};

/// Cluster used by every tool except sendSolTransaction
const READ_NETWORK: Network = Network::Mainnet;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBalanceArgs {
    pub wallet_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionsArgs {
    pub wallet_address: String,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBuffersArgs {
    pub payer_key: SecretKeyBytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseBufferArgs {
    pub buffer_pubkey: String,
    pub payer_key: SecretKeyBytes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProgramLogsArgs {
    pub program_id: String,
    #[serde(default = "default_log_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSolArgs {
    pub from_private_key: SecretKeyBytes,
    pub to_public_key: String,
    pub amount_sol: f64,
    #[serde(default = "default_send_network")]
    pub mode: Network,
}

fn default_log_limit() -> i64 {
    DEFAULT_LOG_LIMIT
}

fn default_send_network() -> Network {
    Network::Devnet
}

fn parse_address(address: &str) -> Result<Pubkey, ToolError> {
    address.parse().map_err(ToolError::invalid_input)
}

fn keypair(secret: &SecretKeyBytes) -> Result<Keypair, ToolError> {
    Keypair::from_secret_key(secret).map_err(ToolError::invalid_input)
}

/// Non-negative limit as a signature count
fn signature_limit(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

pub async fn get_balance(clusters: &ClusterClients, args: &GetBalanceArgs) -> ToolResult {
    let address = parse_address(&args.wallet_address)?;
    let gateway = clusters.gateway(READ_NETWORK);

    let lamports = gateway.get_balance(&address).await.map_err(ToolError::rpc)?;
    debug!("Balance of {}: {} lamports", address, lamports);

    Ok(ToolCallResult::text(format!(
        "Balance of {}: {} SOL",
        args.wallet_address,
        programs::lamports_to_sol(lamports)
    )))
}

pub async fn get_transactions(clusters: &ClusterClients, args: &GetTransactionsArgs) -> ToolResult {
    let none_found = || {
        ToolCallResult::text(format!(
            "No transactions found for wallet address: {}",
            args.wallet_address
        ))
    };

    if args.limit <= 0 {
        return Ok(none_found());
    }

    let address = parse_address(&args.wallet_address)?;
    let gateway = clusters.gateway(READ_NETWORK);

    let signatures = gateway
        .get_signatures_for_address(&address, signature_limit(args.limit))
        .await
        .map_err(ToolError::rpc)?;
    if signatures.is_empty() {
        return Ok(none_found());
    }

    let records = try_join_all(
        signatures
            .iter()
            .map(|info| gateway.get_transaction(&info.signature)),
    )
    .await
    .map_err(ToolError::rpc)?;
    info!("Fetched {} transactions for {}", records.len(), address);

    let items = records
        .iter()
        .map(|record| {
            serde_json::to_string(record)
                .map(|json| ToolContent::text(format!("Transaction: {}", json)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(ToolError::rpc)?;

    Ok(ToolCallResult::with_items(
        format!("Transactions for wallet address: {}", args.wallet_address),
        items,
    ))
}

pub async fn list_buffers(clusters: &ClusterClients, args: &ListBuffersArgs) -> ToolResult {
    let payer = keypair(&args.payer_key)?.pubkey();
    let filters = [
        AccountFilter::DataSize(BUFFER_ACCOUNT_SIZE),
        AccountFilter::Memcmp(Memcmp {
            offset: BUFFER_AUTHORITY_OFFSET,
            bytes: payer.to_base58(),
        }),
    ];

    let accounts = clusters
        .gateway(READ_NETWORK)
        .get_program_accounts(&BPF_LOADER_UPGRADEABLE_ID, &filters)
        .await
        .map_err(ToolError::rpc)?;
    info!("Found {} buffers for authority {}", accounts.len(), payer);

    if accounts.is_empty() {
        return Ok(ToolCallResult::text("No program buffers found for this payer."));
    }

    let items = accounts
        .iter()
        .map(|account| ToolContent::text(format!("Buffer: {}", account.pubkey)))
        .collect();

    Ok(ToolCallResult::with_items(
        format!("Found {} program buffer(s):", accounts.len()),
        items,
    ))
}

/// Compile, sign, and hash-stamp a single-payer transaction
fn build_transaction(
    instruction: wallet_core::Instruction,
    payer: &Keypair,
    blockhash: &BlockhashInfo,
) -> Result<Transaction, ToolError> {
    let recent_blockhash: Hash = blockhash.blockhash.parse().map_err(ToolError::rpc)?;
    let message =
        Message::new(&[instruction], &payer.pubkey(), recent_blockhash).map_err(ToolError::submission)?;

    let mut transaction = Transaction::new_unsigned(message);
    transaction.sign(&[payer]).map_err(ToolError::submission)?;
    Ok(transaction)
}

pub async fn close_buffer(clusters: &ClusterClients, args: &CloseBufferArgs) -> ToolResult {
    let payer = keypair(&args.payer_key)?;
    let buffer = parse_address(&args.buffer_pubkey)?;
    let gateway = clusters.gateway(READ_NETWORK);

    // Recipient and authority are both the payer
    let instruction = programs::close_buffer(&buffer, &payer.pubkey(), &payer.pubkey());

    let blockhash = gateway.get_latest_blockhash().await.map_err(ToolError::rpc)?;
    let transaction = build_transaction(instruction, &payer, &blockhash)?;

    let config = clusters.confirm_config();
    let options = SendOptions {
        skip_preflight: false,
        preflight_commitment: config.commitment,
    };
    let signature = send_and_confirm(
        gateway.as_ref(),
        &transaction,
        blockhash.last_valid_block_height,
        options,
        config,
    )
    .await
    .map_err(ToolError::submission)?;
    info!("Closed buffer {} in {}", buffer, signature);

    Ok(ToolCallResult::with_items(
        format!("Successfully closed buffer: {}", args.buffer_pubkey),
        vec![ToolContent::text(format!("Transaction signature: {}", signature))],
    ))
}

pub async fn get_program_logs(clusters: &ClusterClients, args: &GetProgramLogsArgs) -> ToolResult {
    let program = parse_address(&args.program_id)?;
    let gateway = clusters.gateway(READ_NETWORK);

    let signatures = gateway
        .get_signatures_for_address(&program, signature_limit(args.limit))
        .await
        .map_err(ToolError::rpc)?;

    let mut items = Vec::new();
    for info in &signatures {
        let Some(record) = gateway
            .get_transaction(&info.signature)
            .await
            .map_err(ToolError::rpc)?
        else {
            debug!("Transaction {} no longer available", info.signature);
            continue;
        };
        let Some(logs) = record.log_messages() else {
            continue;
        };

        let instructions = extract_instructions(&record)
            .map_err(ToolError::rpc)?
            .iter()
            .map(|ix| {
                serde_json::to_string(ix)
                    .map(|json| ToolContent::text(format!("Instruction: {}", json)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(ToolError::rpc)?;

        let joined = if logs.is_empty() {
            "No logs".to_string()
        } else {
            logs.join("\n")
        };

        items.push(ToolContent::with_items(
            format!(
                "Transaction: {}\nSlot: {}\nLog Messages: {}",
                info.signature, record.slot, joined
            ),
            instructions,
        ));
    }

    if items.is_empty() {
        return Ok(ToolCallResult::text(format!(
            "No transaction logs found for program: {}",
            args.program_id
        )));
    }

    Ok(ToolCallResult::with_items(
        format!(
            "Found {} transaction(s) for program: {}",
            items.len(),
            args.program_id
        ),
        items,
    ))
}

pub async fn send_sol_transaction(clusters: &ClusterClients, args: &SendSolArgs) -> ToolResult {
    let sender = keypair(&args.from_private_key)?;
    let recipient = parse_address(&args.to_public_key)?;
    let lamports = programs::sol_to_lamports(args.amount_sol).map_err(ToolError::invalid_input)?;
    let gateway = clusters.gateway(args.mode);

    info!(
        "Sending {} lamports from {} to {} on {}",
        lamports,
        sender.pubkey(),
        recipient,
        args.mode.label()
    );

    let instruction = programs::system_transfer(&sender.pubkey(), &recipient, lamports);
    let blockhash = gateway.get_latest_blockhash().await.map_err(ToolError::rpc)?;
    let transaction = build_transaction(instruction, &sender, &blockhash)?;

    let config = clusters.confirm_config();
    let options = SendOptions {
        skip_preflight: true,
        preflight_commitment: config.commitment,
    };
    let signature = send_and_confirm(
        gateway.as_ref(),
        &transaction,
        blockhash.last_valid_block_height,
        options,
        config,
    )
    .await
    .map_err(ToolError::submission)?;

    Ok(ToolCallResult::with_items(
        format!(
            "Successfully sent {} SOL to {}",
            args.amount_sol, args.to_public_key
        ),
        vec![
            ToolContent::text(format!("Transaction signature: {}", signature)),
            ToolContent::text(format!("Network: {}", args.mode.label())),
        ],
    ))
}
