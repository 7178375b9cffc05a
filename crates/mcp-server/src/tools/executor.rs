//! Dispatch tool calls to their handlers

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use solana_rpc::ClusterClients;

use super::error::into_envelope;
use super::handlers::{self, *};
use super::registry::*;
use crate::protocol::{McpError, ToolCallResult};

/// Runs wallet tools against the configured clusters
pub struct ToolExecutor {
    clusters: ClusterClients,
}

impl ToolExecutor {
    pub fn new(clusters: ClusterClients) -> Self {
        Self { clusters }
    }

    /// Execute a tool by name
    ///
    /// `arguments` must already have passed the tool's schema. Handler
    /// failures come back as error envelopes; only undecodable arguments
    /// and unknown names are protocol errors.
    pub async fn execute(&self, tool_name: &str, arguments: Value) -> Result<ToolCallResult, McpError> {
        debug!("Executing tool: {}", tool_name);
        let clusters = &self.clusters;

        let result = match tool_name {
            GET_TRANSACTIONS => {
                let args: GetTransactionsArgs = decode(tool_name, arguments)?;
                let prefix = format!(
                    "Failed to retrieve transactions for wallet address: {}: ",
                    args.wallet_address
                );
                into_envelope(
                    tool_name,
                    &prefix,
                    handlers::get_transactions(clusters, &args).await,
                    None,
                )
            }
            GET_BALANCE => {
                let args: GetBalanceArgs = decode(tool_name, arguments)?;
                let prefix = format!(
                    "Failed to retrieve balance for wallet address {}: ",
                    args.wallet_address
                );
                into_envelope(
                    tool_name,
                    &prefix,
                    handlers::get_balance(clusters, &args).await,
                    None,
                )
            }
            LIST_BUFFERS => {
                let args: ListBuffersArgs = decode(tool_name, arguments)?;
                into_envelope(
                    tool_name,
                    "Error listing buffers: ",
                    handlers::list_buffers(clusters, &args).await,
                    Some(&args.payer_key),
                )
            }
            CLOSE_BUFFER => {
                let args: CloseBufferArgs = decode(tool_name, arguments)?;
                into_envelope(
                    tool_name,
                    "Error closing buffer: ",
                    handlers::close_buffer(clusters, &args).await,
                    Some(&args.payer_key),
                )
            }
            GET_PROGRAM_LOGS => {
                let args: GetProgramLogsArgs = decode(tool_name, arguments)?;
                into_envelope(
                    tool_name,
                    "Error retrieving program logs: ",
                    handlers::get_program_logs(clusters, &args).await,
                    None,
                )
            }
            SEND_SOL_TRANSACTION => {
                let args: SendSolArgs = decode(tool_name, arguments)?;
                into_envelope(
                    tool_name,
                    "Error sending transaction: ",
                    handlers::send_sol_transaction(clusters, &args).await,
                    Some(&args.from_private_key),
                )
            }
            _ => return Err(McpError::invalid_params(format!("Unknown tool: {}", tool_name))),
        };

        Ok(result)
    }
}

/// Decode arguments without echoing their values
fn decode<T: DeserializeOwned>(tool_name: &str, arguments: Value) -> Result<T, McpError> {
    serde_json::from_value(arguments).map_err(|_| {
        McpError::invalid_params(format!(
            "Invalid arguments for tool {}: arguments do not match the input schema",
            tool_name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solana_rpc::mock::MockGateway;
    use solana_rpc::ConfirmConfig;
    use std::sync::Arc;
    use wallet_core::Keypair;

    fn executor(mainnet: MockGateway) -> ToolExecutor {
        ToolExecutor::new(ClusterClients::new(
            Arc::new(mainnet),
            Arc::new(MockGateway::new("mock://devnet")),
            ConfirmConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_program_logs_limit_defaults_to_ten() {
        let mainnet = Arc::new(MockGateway::new("mock://mainnet"));
        let executor = ToolExecutor::new(ClusterClients::new(
            mainnet.clone(),
            Arc::new(MockGateway::new("mock://devnet")),
            ConfirmConfig::default(),
        ));

        let result = executor
            .execute(
                GET_PROGRAM_LOGS,
                json!({"programId": "BPFLoaderUpgradeab1e11111111111111111111111"}),
            )
            .await
            .unwrap();

        assert!(result.first_text().starts_with("No transaction logs found"));
        assert_eq!(mainnet.limits(), vec![10]);
    }

    #[tokio::test]
    async fn test_handler_failure_is_envelope_not_protocol_error() {
        let executor = executor(MockGateway::new("mock://mainnet").with_failure(
            "getProgramAccounts",
            "node is behind",
        ));
        let secret: Vec<u8> = Keypair::generate().to_secret_key().expose().to_vec();

        let result = executor
            .execute(LIST_BUFFERS, json!({"payerKey": secret}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert_eq!(
            result.first_text(),
            "Error listing buffers: RPC error -32000: node is behind"
        );
    }

    #[tokio::test]
    async fn test_bad_secret_is_not_echoed() {
        let executor = executor(MockGateway::new("mock://mainnet"));
        let secret: Vec<u8> = (100..132).collect();

        let result = executor
            .execute(LIST_BUFFERS, json!({"payerKey": secret}))
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.first_text().starts_with("Error listing buffers: "));
        assert!(!result.first_text().contains("100, 101"));
    }

    #[tokio::test]
    async fn test_undecodable_arguments() {
        let executor = executor(MockGateway::new("mock://mainnet"));

        let err = executor
            .execute(GET_TRANSACTIONS, json!({"walletAddress": "x", "limit": 1.5}))
            .await
            .unwrap_err();

        assert_eq!(err.code, -32602);
        assert!(!err.message.contains("1.5"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let executor = executor(MockGateway::new("mock://mainnet"));
        let err = executor.execute("airdrop", json!({})).await.unwrap_err();

        assert_eq!(err.code, -32602);
    }
}
