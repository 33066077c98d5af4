//! JSON-RPC request/response envelopes.
//!
//! Bitcoin Core speaks JSON-RPC 1.0 style: a named method with an ordered,
//! positional parameter array. Trailing omitted parameters must be absent
//! from the array — the node treats an explicit `null` differently (for
//! example when selecting the default account) — so the request constructor
//! trims trailing nulls and leaves interior ones intact.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version tag sent with every request.
pub const JSONRPC_VERSION: &str = "1.0";

/// One command invocation.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    /// Build a request, trimming trailing `null` parameters.
    pub fn new(id: u64, method: impl Into<String>, mut params: Vec<Value>) -> Self {
        while params.last() == Some(&Value::Null) {
            params.pop();
        }
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            params,
        }
    }
}

/// The node's reply: exactly one of `result` or `error` is populated.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorObject>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// Application-level error reported by the node.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}
