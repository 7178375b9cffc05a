//! Typed RPC results
//!
//! Only the fields the server reads are modelled; everything else a node
//! returns is kept in `extra` maps so records serialize back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wallet_core::Commitment;

/// `{context, value}` wrapper used by several RPC methods
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub context: Value,
    pub value: T,
}

/// Entry returned by `getSignaturesForAddress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

/// Result of `getTransaction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: EncodedTransaction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionRecord {
    /// Log lines, when the node recorded them
    pub fn log_messages(&self) -> Option<&[String]> {
        self.meta.as_ref()?.log_messages.as_deref()
    }
}

/// Execution metadata of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub log_messages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_addresses: Option<LoadedAddresses>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Addresses pulled in from address lookup tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

/// Signatures plus message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedTransaction {
    pub signatures: Vec<String>,
    pub message: UiMessage,
}

/// Message as returned by the node, depending on the requested encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiMessage {
    /// `jsonParsed`: program ids already resolved on every instruction
    Parsed(UiParsedMessage),
    /// `json`: instructions reference account keys by index
    Raw(UiRawMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiParsedMessage {
    pub account_keys: Vec<ParsedAccountKey>,
    pub instructions: Vec<UiInstruction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAccountKey {
    pub pubkey: String,
    #[serde(default)]
    pub signer: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiRawMessage {
    pub account_keys: Vec<String>,
    pub instructions: Vec<UiCompiledInstruction>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Instruction inside a `jsonParsed` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiInstruction {
    Parsed(UiParsedInstruction),
    PartiallyDecoded(UiPartiallyDecodedInstruction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiParsedInstruction {
    pub program: String,
    pub program_id: String,
    pub parsed: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPartiallyDecodedInstruction {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_height: Option<u32>,
}

/// Instruction inside a `json` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiCompiledInstruction {
    pub program_id_index: u8,
    #[serde(default)]
    pub accounts: Vec<u8>,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_height: Option<u32>,
}

/// Flattened view of an instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InstructionView {
    /// The node could decode the instruction
    #[serde(rename_all = "camelCase")]
    Parsed {
        program: String,
        program_id: String,
        parsed: Value,
    },
    /// Program id plus the opaque (base58) data
    #[serde(rename_all = "camelCase")]
    Raw { program_id: String, data: String },
}

/// Entry returned by `getProgramAccounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramAccount {
    pub pubkey: String,
    pub account: AccountInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub executable: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Server-side filter for `getProgramAccounts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountFilter {
    DataSize(u64),
    Memcmp(Memcmp),
}

/// Match `bytes` (base58) at `offset` in the account data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memcmp {
    pub offset: usize,
    pub bytes: String,
}

/// Result of `getLatestBlockhash`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockhashInfo {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Entry returned by `getSignatureStatuses`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Highest commitment this status has reached
    ///
    /// Nodes that omit `confirmationStatus` report `confirmations: null`
    /// once the slot is rooted.
    pub fn commitment(&self) -> Commitment {
        match (self.confirmation_status, self.confirmations) {
            (Some(status), _) => status,
            (None, None) => Commitment::Finalized,
            (None, Some(_)) => Commitment::Processed,
        }
    }
}

/// Options for `sendTransaction`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub skip_preflight: bool,
    pub preflight_commitment: Commitment,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            skip_preflight: false,
            preflight_commitment: Commitment::Confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_message_instruction_variants() {
        let message: UiMessage = serde_json::from_value(json!({
            "accountKeys": [{"pubkey": "A", "signer": true, "writable": true, "source": "transaction"}],
            "instructions": [
                {"program": "system", "programId": "11111111111111111111111111111111",
                 "parsed": {"type": "transfer"}, "stackHeight": null},
                {"programId": "Prog", "accounts": ["A"], "data": "3Bxs", "stackHeight": null}
            ],
            "recentBlockhash": "H"
        }))
        .unwrap();

        let UiMessage::Parsed(parsed) = message else {
            panic!("expected parsed message");
        };
        assert!(matches!(parsed.instructions[0], UiInstruction::Parsed(_)));
        assert!(matches!(parsed.instructions[1], UiInstruction::PartiallyDecoded(_)));
        assert_eq!(parsed.extra["recentBlockhash"], "H");
    }

    #[test]
    fn test_raw_message_detected() {
        let message: UiMessage = serde_json::from_value(json!({
            "accountKeys": ["A", "B"],
            "header": {"numRequiredSignatures": 1},
            "instructions": [{"programIdIndex": 1, "accounts": [0], "data": "3Bxs"}],
            "recentBlockhash": "H"
        }))
        .unwrap();

        assert!(matches!(message, UiMessage::Raw(_)));
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let raw = json!({
            "slot": 42,
            "blockTime": 1700000000,
            "meta": {"err": null, "fee": 5000, "logMessages": ["Program log: hi"], "computeUnitsConsumed": 150},
            "transaction": {
                "signatures": ["sig"],
                "message": {"accountKeys": ["A"], "instructions": [], "recentBlockhash": "H"}
            },
            "version": "legacy"
        });

        let record: TransactionRecord = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(record.log_messages().unwrap(), &["Program log: hi".to_string()]);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["meta"]["computeUnitsConsumed"], 150);
        assert_eq!(back["version"], "legacy");
        assert_eq!(back["slot"], 42);
    }

    #[test]
    fn test_filters_serialize_to_rpc_shape() {
        let filters = vec![
            AccountFilter::DataSize(165),
            AccountFilter::Memcmp(Memcmp {
                offset: 1,
                bytes: "Key".to_string(),
            }),
        ];

        assert_eq!(
            serde_json::to_value(&filters).unwrap(),
            json!([{"dataSize": 165}, {"memcmp": {"offset": 1, "bytes": "Key"}}])
        );
    }

    #[test]
    fn test_instruction_view_shapes() {
        let raw = InstructionView::Raw {
            program_id: "P".to_string(),
            data: "D".to_string(),
        };
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!({"programId": "P", "data": "D"}));
    }

    #[test]
    fn test_status_commitment_fallback() {
        let rooted: SignatureStatus =
            serde_json::from_value(json!({"slot": 1, "confirmations": null, "err": null})).unwrap();
        assert_eq!(rooted.commitment(), Commitment::Finalized);

        let fresh: SignatureStatus =
            serde_json::from_value(json!({"slot": 1, "confirmations": 0, "err": null})).unwrap();
        assert_eq!(fresh.commitment(), Commitment::Processed);
    }
}
