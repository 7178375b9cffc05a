//! JSON-RPC 2.0 client over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use wallet_core::{Commitment, Pubkey, Transaction};

use crate::error::{RpcError, RpcResult};
use crate::gateway::RpcGateway;
use crate::types::{
    AccountFilter, BlockhashInfo, ProgramAccount, RpcResponse, SendOptions, SignatureInfo,
    SignatureStatus, TransactionRecord,
};

/// Highest transaction version this client understands
const MAX_SUPPORTED_TRANSACTION_VERSION: u8 = 0;

/// Transactions are fetched with program-parsed instructions where possible
const TRANSACTION_ENCODING: &str = "jsonParsed";

/// Error object of a JSON-RPC response
#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// HTTP client bound to one cluster endpoint
pub struct HttpRpcClient {
    url: String,
    client: Client,
    commitment: Commitment,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, commitment: Commitment, timeout: Duration) -> RpcResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.into(),
            client,
            commitment,
            next_id: AtomicU64::new(1),
        })
    }

    /// Commitment for history lookups, which nodes refuse below `confirmed`
    fn history_commitment(&self) -> Commitment {
        self.commitment.max(Commitment::Confirmed)
    }

    /// Issue one JSON-RPC call and decode its `result`
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> RpcResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("RPC {} #{} -> {}", method, id, self.url);

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("RPC {} failed with HTTP {}", method, status);
            return Err(RpcError::HttpError(format!("HTTP {} - {}", status, text)));
        }

        let reply: JsonRpcReply = serde_json::from_str(&text).map_err(|e| {
            RpcError::UnexpectedResponse(format!("{} returned invalid JSON: {}", method, e))
        })?;

        if let Some(error) = reply.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        serde_json::from_value(reply.result.unwrap_or(Value::Null)).map_err(|e| {
            RpcError::UnexpectedResponse(format!("{} result did not match: {}", method, e))
        })
    }
}

#[async_trait]
impl RpcGateway for HttpRpcClient {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn get_balance(&self, address: &Pubkey) -> RpcResult<u64> {
        let response: RpcResponse<u64> = self
            .call(
                "getBalance",
                json!([address.to_base58(), {"commitment": self.commitment}]),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> RpcResult<Vec<SignatureInfo>> {
        self.call(
            "getSignaturesForAddress",
            json!([address.to_base58(), {"limit": limit, "commitment": self.history_commitment()}]),
        )
        .await
    }

    async fn get_transaction(&self, signature: &str) -> RpcResult<Option<TransactionRecord>> {
        self.call(
            "getTransaction",
            json!([signature, {
                "encoding": TRANSACTION_ENCODING,
                "commitment": self.history_commitment(),
                "maxSupportedTransactionVersion": MAX_SUPPORTED_TRANSACTION_VERSION,
            }]),
        )
        .await
    }

    async fn get_program_accounts(
        &self,
        program: &Pubkey,
        filters: &[AccountFilter],
    ) -> RpcResult<Vec<ProgramAccount>> {
        self.call(
            "getProgramAccounts",
            json!([program.to_base58(), {
                "commitment": self.commitment,
                "encoding": "base64",
                "filters": filters,
                "dataSlice": {"offset": 0, "length": 0},
            }]),
        )
        .await
    }

    async fn get_latest_blockhash(&self) -> RpcResult<BlockhashInfo> {
        let response: RpcResponse<BlockhashInfo> = self
            .call("getLatestBlockhash", json!([{"commitment": self.commitment}]))
            .await?;
        Ok(response.value)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: SendOptions,
    ) -> RpcResult<String> {
        self.call(
            "sendTransaction",
            json!([transaction.to_base64(), {
                "encoding": "base64",
                "skipPreflight": options.skip_preflight,
                "preflightCommitment": options.preflight_commitment,
            }]),
        )
        .await
    }

    async fn get_signature_statuses(
        &self,
        signatures: &[String],
    ) -> RpcResult<Vec<Option<SignatureStatus>>> {
        let response: RpcResponse<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([signatures, {"searchTransactionHistory": false}]),
            )
            .await?;
        Ok(response.value)
    }

    async fn get_block_height(&self) -> RpcResult<u64> {
        self.call("getBlockHeight", json!([{"commitment": self.commitment}]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Value>>>;

    /// Stand up a JSON-RPC stub that answers by method name
    async fn stub(seen: Seen) -> String {
        let app = Router::new().route(
            "/",
            post(move |Json(req): Json<Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(req.clone());
                    let id = req["id"].clone();
                    let mut reply = match req["method"].as_str().unwrap_or_default() {
                        "getBalance" => json!({"result": {"context": {"slot": 1}, "value": 2_500_000_000u64}}),
                        "getSignaturesForAddress" => json!({"result": [
                            {"signature": "s1", "slot": 10, "err": null, "memo": null,
                             "blockTime": 1700000000, "confirmationStatus": "finalized"}
                        ]}),
                        "getTransaction" => json!({"result": null}),
                        "getLatestBlockhash" => json!({"result": {"context": {"slot": 1}, "value": {
                            "blockhash": "11111111111111111111111111111111", "lastValidBlockHeight": 99
                        }}}),
                        "getBlockHeight" => json!({"result": 50}),
                        _ => json!({"error": {"code": -32601, "message": "Method not found"}}),
                    };
                    reply["jsonrpc"] = json!("2.0");
                    reply["id"] = id;
                    Json(reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn client(url: &str) -> HttpRpcClient {
        HttpRpcClient::new(url, Commitment::Confirmed, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_balance_unwraps_context() {
        let seen = Seen::default();
        let url = stub(seen.clone()).await;

        let balance = client(&url)
            .get_balance(&Pubkey::new_from_array([1u8; 32]))
            .await
            .unwrap();
        assert_eq!(balance, 2_500_000_000);

        let requests = seen.lock().unwrap();
        assert_eq!(requests[0]["method"], "getBalance");
        assert_eq!(requests[0]["params"][1]["commitment"], "confirmed");
    }

    #[tokio::test]
    async fn test_signatures_and_missing_transaction() {
        let seen = Seen::default();
        let url = stub(seen.clone()).await;
        let rpc = client(&url);

        let sigs = rpc
            .get_signatures_for_address(&Pubkey::default(), 5)
            .await
            .unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].signature, "s1");
        assert_eq!(sigs[0].confirmation_status, Some(Commitment::Finalized));

        assert!(rpc.get_transaction("s1").await.unwrap().is_none());

        let requests = seen.lock().unwrap();
        assert_eq!(requests[0]["params"][1]["limit"], 5);
        assert_eq!(requests[1]["params"][1]["maxSupportedTransactionVersion"], 0);
        assert_eq!(requests[1]["params"][1]["encoding"], "jsonParsed");
    }

    #[tokio::test]
    async fn test_history_lookups_raise_processed_to_confirmed() {
        let seen = Seen::default();
        let url = stub(seen.clone()).await;
        let rpc = HttpRpcClient::new(&url, Commitment::Processed, Duration::from_secs(5)).unwrap();

        rpc.get_signatures_for_address(&Pubkey::default(), 1)
            .await
            .unwrap();
        rpc.get_transaction("s1").await.unwrap();
        rpc.get_balance(&Pubkey::default()).await.unwrap();

        let requests = seen.lock().unwrap();
        assert_eq!(requests[0]["params"][1]["commitment"], "confirmed");
        assert_eq!(requests[1]["params"][1]["commitment"], "confirmed");
        assert_eq!(requests[2]["params"][1]["commitment"], "processed");
    }

    #[tokio::test]
    async fn test_history_lookups_keep_finalized() {
        let seen = Seen::default();
        let url = stub(seen.clone()).await;
        let rpc = HttpRpcClient::new(&url, Commitment::Finalized, Duration::from_secs(5)).unwrap();

        rpc.get_transaction("s1").await.unwrap();

        assert_eq!(seen.lock().unwrap()[0]["params"][1]["commitment"], "finalized");
    }

    #[tokio::test]
    async fn test_blockhash_and_block_height() {
        let url = stub(Seen::default()).await;
        let rpc = client(&url);

        let info = rpc.get_latest_blockhash().await.unwrap();
        assert_eq!(info.last_valid_block_height, 99);
        assert_eq!(rpc.get_block_height().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_rpc_error_object_is_surfaced() {
        let url = stub(Seen::default()).await;

        let err = client(&url)
            .get_program_accounts(&Pubkey::default(), &[AccountFilter::DataSize(165)])
            .await
            .unwrap_err();

        match err {
            RpcError::Rpc { code, message } => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let err = client("http://127.0.0.1:9")
            .get_block_height()
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::HttpError(_)));
    }
}
