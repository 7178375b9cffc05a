//! MCP request handler

use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::capabilities::ServerCapabilities;
use super::types::*;
use crate::tools::{ToolExecutor, ToolRegistry};
use solana_rpc::ClusterClients;

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "walletmcp";

/// Handler for MCP requests
///
/// Holds no per-call state, so one handler can serve concurrent requests.
pub struct RequestHandler {
    registry: ToolRegistry,
    executor: ToolExecutor,
    server_version: String,
    initialized: AtomicBool,
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(clusters: ClusterClients) -> Self {
        Self {
            registry: ToolRegistry::new(),
            executor: ToolExecutor::new(clusters),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Whether the client has completed the initialize handshake
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Handle an incoming message
    ///
    /// Returns `None` for notifications and stray responses. A request
    /// whose id is `null` is answered with an invalid-request error.
    pub async fn handle(&self, message: McpMessage) -> Option<McpMessage> {
        match (message.method.as_deref(), message.id.clone()) {
            (Some(method), Some(Value::Null)) => {
                warn!("Rejecting {} request with null id", method);
                Some(McpMessage::error_response(
                    Some(Value::Null),
                    McpError::invalid_request(),
                ))
            }
            (Some(method), Some(id)) => {
                debug!("Handling request: {}", method);

                let result = match method {
                    "initialize" => self.handle_initialize(message.params),
                    "ping" => Ok(json!({})),
                    "tools/list" => self.handle_tools_list(),
                    "tools/call" => self.handle_tools_call(message.params).await,
                    _ => Err(McpError::method_not_found()),
                };

                Some(match result {
                    Ok(result) => McpMessage::response(id, result),
                    Err(error) => McpMessage::error_response(Some(id), error),
                })
            }
            (Some(method), None) => {
                match method {
                    "notifications/initialized" | "initialized" => {
                        self.initialized.store(true, Ordering::Relaxed);
                        info!("Client initialized");
                    }
                    "notifications/cancelled" => debug!("Request cancelled"),
                    _ => debug!("Unknown notification: {}", method),
                }
                None
            }
            (None, _) => {
                debug!("Received unexpected response");
                None
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::invalid_params(e.to_string()))?
            .ok_or_else(|| McpError::invalid_params("Missing params"))?;

        info!(
            "Initializing session with client: {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::with_tools(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: self.server_version.clone(),
            },
        };

        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let result = ToolsListResult {
            tools: self.registry.list(),
        };
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|_| McpError::invalid_params("Malformed tools/call params"))?
            .ok_or_else(|| McpError::invalid_params("Missing params"))?;

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        self.registry.validate(&params.name, &arguments)?;

        info!("Calling tool: {}", params.name);
        let result = self.executor.execute(&params.name, arguments).await?;
        serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_rpc::mock::MockGateway;
    use solana_rpc::ConfirmConfig;
    use std::sync::Arc;
    use wallet_core::Pubkey;

    fn handler_with(mainnet: MockGateway) -> RequestHandler {
        RequestHandler::new(ClusterClients::new(
            Arc::new(mainnet),
            Arc::new(MockGateway::new("mock://devnet")),
            ConfirmConfig::default(),
        ))
    }

    fn handler() -> RequestHandler {
        handler_with(MockGateway::new("mock://mainnet"))
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = handler()
            .handle(McpMessage::request(
                1,
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"}
                })),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialized_notification() {
        let handler = handler();
        let response = handler
            .handle(McpMessage::notification("notifications/initialized", None))
            .await;

        assert!(response.is_none());
        assert!(handler.is_initialized());
    }

    #[tokio::test]
    async fn test_ping_and_unknown_method() {
        let handler = handler();

        let pong = handler.handle(McpMessage::request(2, "ping", None)).await.unwrap();
        assert_eq!(pong.result.unwrap(), json!({}));

        let missing = handler
            .handle(McpMessage::request(3, "resources/list", None))
            .await
            .unwrap();
        assert_eq!(missing.error.unwrap().code, -32601);
        assert_eq!(missing.id, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_null_id_request_gets_error_reply() {
        let message: McpMessage =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).unwrap();

        let response = handler().handle(message).await.unwrap();

        assert_eq!(response.error.as_ref().unwrap().code, -32600);
        assert!(response.result.is_none());
        let wire = serde_json::to_value(&response).unwrap();
        assert!(wire.get("id").unwrap().is_null());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = handler()
            .handle(McpMessage::request(4, "tools/list", None))
            .await
            .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 6);
        assert_eq!(tools[0]["name"], "getTransactions");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tools_call_get_balance() {
        let address = Pubkey::new_from_array([3u8; 32]);
        let handler =
            handler_with(MockGateway::new("mock://mainnet").with_balance(address, 1_000_000_000));

        let response = handler
            .handle(McpMessage::request(
                5,
                "tools/call",
                Some(json!({"name": "getBalance", "arguments": {"walletAddress": address.to_base58()}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(
            result["content"][0]["text"],
            format!("Balance of {}: 1 SOL", address)
        );
        assert!(result.get("isError").is_none());
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let response = handler()
            .handle(McpMessage::request(
                6,
                "tools/call",
                Some(json!({"name": "airdrop", "arguments": {}})),
            ))
            .await
            .unwrap();

        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_tools_call_schema_mismatch_hides_values() {
        let response = handler()
            .handle(McpMessage::request(
                7,
                "tools/call",
                Some(json!({
                    "name": "sendSolTransaction",
                    "arguments": {"fromPrivateKey": [201, 202, 203], "toPublicKey": "x"}
                })),
            ))
            .await
            .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(!error.message.contains("201"));
    }

    #[tokio::test]
    async fn test_tools_call_failure_is_result_with_flag() {
        let handler = handler_with(
            MockGateway::new("mock://mainnet").with_failure("getSignaturesForAddress", "timeout"),
        );

        let response = handler
            .handle(McpMessage::request(
                8,
                "tools/call",
                Some(json!({"name": "getTransactions", "arguments": {"walletAddress": Pubkey::default().to_base58(), "limit": 3}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"].as_array().unwrap().len(), 1);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Failed to retrieve transactions for wallet address: "));
    }
}
