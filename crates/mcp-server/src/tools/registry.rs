//! Tool names, descriptions, and input schemas

use indexmap::IndexMap;
use jsonschema::validator_for;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::protocol::{McpError, McpInputSchema, McpTool};

pub const GET_TRANSACTIONS: &str = "getTransactions";
pub const GET_BALANCE: &str = "getBalance";
pub const LIST_BUFFERS: &str = "listBuffers";
pub const CLOSE_BUFFER: &str = "closeBuffer";
pub const GET_PROGRAM_LOGS: &str = "getProgramLogs";
pub const SEND_SOL_TRANSACTION: &str = "sendSolTransaction";

/// Default number of signatures scanned by getProgramLogs
pub const DEFAULT_LOG_LIMIT: i64 = 10;

/// Registered tools in the order `tools/list` reports them
pub struct ToolRegistry {
    tools: IndexMap<&'static str, McpTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            tools: IndexMap::new(),
        };

        registry.register(
            GET_TRANSACTIONS,
            "Get transactions of a wallet. The limit is the number of most recent transactions to retrieve",
            json!({
                "walletAddress": {"type": "string", "description": "Base58 wallet address"},
                "limit": {"type": "integer", "description": "Number of transactions to retrieve"}
            }),
            &["walletAddress", "limit"],
        );

        registry.register(
            GET_BALANCE,
            "Get the SOL balance of a wallet",
            json!({
                "walletAddress": {"type": "string", "description": "Base58 wallet address"}
            }),
            &["walletAddress"],
        );

        registry.register(
            LIST_BUFFERS,
            "List program buffers associated with a specific payer",
            json!({
                "payerKey": secret_key_schema("Secret key of the buffer authority")
            }),
            &["payerKey"],
        );

        registry.register(
            CLOSE_BUFFER,
            "Close a specific program buffer and return its funds to the payer",
            json!({
                "bufferPubkey": {"type": "string", "description": "Base58 address of the buffer account"},
                "payerKey": secret_key_schema("Secret key of the buffer authority")
            }),
            &["bufferPubkey", "payerKey"],
        );

        registry.register(
            GET_PROGRAM_LOGS,
            "Get transaction logs for a specific Solana program",
            json!({
                "programId": {"type": "string", "description": "Base58 program address"},
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "default": DEFAULT_LOG_LIMIT,
                    "description": "Number of recent transactions to scan"
                }
            }),
            &["programId"],
        );

        registry.register(
            SEND_SOL_TRANSACTION,
            "Send SOL from one wallet to another",
            json!({
                "fromPrivateKey": secret_key_schema("Secret key of the sender"),
                "toPublicKey": {"type": "string", "description": "Base58 address of the recipient"},
                "amountSol": {"type": "number", "description": "Amount of SOL to send"},
                "mode": {
                    "type": "string",
                    "enum": ["main", "dev"],
                    "default": "dev",
                    "description": "Cluster to send on: main (mainnet-beta) or dev (devnet)"
                }
            }),
            &["fromPrivateKey", "toPublicKey", "amountSol"],
        );

        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        description: &str,
        properties: Value,
        required: &[&str],
    ) {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        self.tools.insert(
            name,
            McpTool {
                name: name.to_string(),
                description: Some(description.to_string()),
                input_schema: McpInputSchema {
                    properties: Some(properties),
                    required: Some(required.iter().map(|r| r.to_string()).collect()),
                    ..Default::default()
                },
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&McpTool> {
        self.tools.get(name)
    }

    /// Tool definitions in registration order
    pub fn list(&self) -> Vec<McpTool> {
        self.tools.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check `arguments` against the tool's input schema
    ///
    /// Error messages name the tool only; argument values may contain
    /// secret keys and are never echoed.
    pub fn validate(&self, name: &str, arguments: &Value) -> Result<(), McpError> {
        let tool = self
            .get(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", name)))?;

        let schema = serde_json::to_value(&tool.input_schema)
            .map_err(|e| McpError::internal_error(e.to_string()))?;
        let validator = validator_for(&schema)
            .map_err(|e| McpError::internal_error(format!("Invalid schema for {}: {}", name, e)))?;

        if validator.is_valid(arguments) {
            Ok(())
        } else {
            debug!("Arguments for {} rejected by schema", name);
            Err(McpError::invalid_params(format!(
                "Invalid arguments for tool {}: arguments do not match the input schema",
                name
            )))
        }
    }
}

fn secret_key_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": {"type": "integer", "minimum": 0, "maximum": 255},
        "description": description
    })
}
