//! Scripted JSON-RPC node double backed by wiremock.
//!
//! Answers the subset of `eth_*` methods the runtime issues, from shared
//! mutable state the test controls: transaction counts, block height, receipt
//! behavior, and canned `eth_call` results keyed by selector.

// Not every test binary uses every knob.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{Value, json};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const CHAIN_ID: u64 = 31337;

// Hardhat account #0 — test key only.
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

#[derive(Default)]
pub struct RpcState {
    /// Pending-inclusive transaction count for the signing account.
    pub tx_count: AtomicU64,
    /// Latest-only transaction count, used when the pending query is failed.
    pub latest_tx_count: AtomicU64,
    pub block_number: AtomicU64,
    /// Force `eth_getTransactionCount(.., "pending")` to return an RPC error.
    pub fail_pending_count: AtomicBool,
    /// Force every `eth_getTransactionCount` to return an RPC error.
    pub fail_all_counts: AtomicBool,
    /// Reject `eth_sendRawTransaction` with this message when set.
    pub reject_send: Mutex<Option<String>>,
    /// `"0x1"` mined ok, `"0x0"` reverted, `None` → receipt not found.
    pub receipt_status: Mutex<Option<String>>,
    /// Extra logs attached to every receipt.
    pub receipt_logs: Mutex<Vec<Value>>,
    /// Selector (with 0x prefix) → ABI-encoded `eth_call` result hex.
    pub call_results: Mutex<HashMap<String, String>>,
    /// Raw transactions accepted by `eth_sendRawTransaction`.
    pub sent: Mutex<Vec<String>>,
}

impl RpcState {
    pub fn new() -> Arc<Self> {
        let state = Self::default();
        *state.receipt_status.lock().unwrap() = Some("0x1".into());
        state.block_number.store(1, Ordering::SeqCst);
        Arc::new(state)
    }

    pub fn set_call_result(&self, selector: &str, result: &str) {
        self.call_results
            .lock()
            .unwrap()
            .insert(selector.to_string(), result.to_string());
    }
}

struct RpcResponder {
    state: Arc<RpcState>,
}

fn rpc_result(id: Value, result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    }))
}

fn rpc_error(id: Value, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": -32000, "message": message},
    }))
}

fn hex_u64(value: u64) -> Value {
    json!(format!("0x{value:x}"))
}

impl RpcResponder {
    fn receipt(&self, tx_hash: &str, status: &str) -> Value {
        let logs = self.state.receipt_logs.lock().unwrap().clone();
        json!({
            "type": "0x0",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": logs,
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "transactionHash": tx_hash,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x3b9aca00",
            "from": TEST_ADDRESS,
            "to": null,
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
        })
    }

    fn handle(&self, body: &Value) -> ResponseTemplate {
        let id = body["id"].clone();
        let method = body["method"].as_str().unwrap_or("");
        let params = &body["params"];

        match method {
            "eth_chainId" => rpc_result(id, hex_u64(CHAIN_ID)),
            "eth_blockNumber" => {
                rpc_result(id, hex_u64(self.state.block_number.load(Ordering::SeqCst)))
            }
            "eth_gasPrice" => rpc_result(id, json!("0x3b9aca00")),
            "eth_estimateGas" => rpc_result(id, json!("0x5208")),
            "eth_getBalance" => rpc_result(id, json!("0xde0b6b3a7640000")),
            "eth_getCode" => rpc_result(id, json!("0x6080")),
            "eth_getTransactionCount" => {
                if self.state.fail_all_counts.load(Ordering::SeqCst) {
                    return rpc_error(id, "transaction count unavailable");
                }
                let tag = params[1].as_str().unwrap_or("latest");
                if tag == "pending" {
                    if self.state.fail_pending_count.load(Ordering::SeqCst) {
                        return rpc_error(id, "pending view unavailable");
                    }
                    rpc_result(id, hex_u64(self.state.tx_count.load(Ordering::SeqCst)))
                } else {
                    rpc_result(id, hex_u64(self.state.latest_tx_count.load(Ordering::SeqCst)))
                }
            }
            "eth_sendRawTransaction" => {
                if let Some(message) = self.state.reject_send.lock().unwrap().clone() {
                    return rpc_error(id, &message);
                }
                let raw = params[0].as_str().unwrap_or_default().to_string();
                let raw_bytes =
                    hex::decode(raw.trim_start_matches("0x")).unwrap_or_default();
                let hash = alloy::primitives::keccak256(&raw_bytes);
                self.state.sent.lock().unwrap().push(raw);
                self.state.tx_count.fetch_add(1, Ordering::SeqCst);
                rpc_result(id, json!(format!("{hash}")))
            }
            "eth_getTransactionReceipt" => {
                let tx_hash = params[0].as_str().unwrap_or_default().to_string();
                match self.state.receipt_status.lock().unwrap().clone() {
                    Some(status) => rpc_result(id, self.receipt(&tx_hash, &status)),
                    None => rpc_result(id, Value::Null),
                }
            }
            "eth_call" => {
                let input = params[0]["input"]
                    .as_str()
                    .or_else(|| params[0]["data"].as_str())
                    .unwrap_or_default();
                let selector: String = input.chars().take(10).collect();
                let results = self.state.call_results.lock().unwrap();
                match results.get(&selector) {
                    Some(result) => rpc_result(id, json!(result)),
                    None => rpc_error(id, "execution reverted"),
                }
            }
            other => rpc_error(id, &format!("unsupported method {other}")),
        }
    }
}

impl Respond for RpcResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        self.handle(&body)
    }
}

/// Start a mock node; returns the server handle (keep it alive) and state.
pub async fn start_mock_node() -> (MockServer, Arc<RpcState>) {
    let state = RpcState::new();
    let server = MockServer::start().await;

    Mock::given(wiremock::matchers::method("POST"))
        .respond_with(RpcResponder {
            state: state.clone(),
        })
        .mount(&server)
        .await;

    (server, state)
}
