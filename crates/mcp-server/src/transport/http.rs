//! HTTP transport for MCP

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use super::TransportError;
use crate::protocol::{McpMessage, RequestHandler};

/// HTTP transport for MCP protocol
pub struct HttpTransport {
    handler: Arc<RequestHandler>,
    addr: SocketAddr,
}

impl HttpTransport {
    /// Create a new HTTP transport listening on `addr`
    pub fn new(handler: Arc<RequestHandler>, addr: SocketAddr) -> Self {
        Self { handler, addr }
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<(), TransportError> {
        let app = router(self.handler.clone());

        if !self.addr.ip().is_loopback() {
            warn!(
                "HTTP transport bound to non-loopback {}; tool arguments carry secret keys in cleartext",
                self.addr
            );
        }
        info!("Starting MCP HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Routes served by the HTTP transport
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/mcp", post(handle_mcp_request))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Handle one MCP JSON-RPC message via HTTP POST
async fn handle_mcp_request(
    State(handler): State<Arc<RequestHandler>>,
    Json(message): Json<McpMessage>,
) -> Json<McpMessage> {
    debug!("HTTP request: {:?}", message.method);

    match handler.handle(message).await {
        Some(response) => Json(response),
        // Notification - return empty success
        None => Json(McpMessage::response(Value::Null, json!({}))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use solana_rpc::mock::MockGateway;
    use solana_rpc::{ClusterClients, ConfirmConfig};
    use tower::ServiceExt;

    fn app() -> Router {
        router(Arc::new(RequestHandler::new(ClusterClients::new(
            Arc::new(MockGateway::new("mock://mainnet")),
            Arc::new(MockGateway::new("mock://devnet")),
            ConfirmConfig::default(),
        ))))
    }

    async fn post_json(body: Value) -> Value {
        let response = app()
            .oneshot(
                Request::post("/mcp")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_ping_over_http() {
        let reply = post_json(json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).await;

        assert_eq!(reply["id"], 9);
        assert_eq!(reply["result"], json!({}));
    }

    #[tokio::test]
    async fn test_notification_gets_empty_result() {
        let reply =
            post_json(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).await;

        assert!(reply["id"].is_null());
        assert_eq!(reply["result"], json!({}));
    }
}
