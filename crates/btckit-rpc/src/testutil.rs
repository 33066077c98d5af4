//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{TransportError, TransportKind};
use crate::transport::Transport;

/// A transport that replays a queued script and records every request body.
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a success envelope wrapping `result`.
    pub fn enqueue_result(&self, result: Value) {
        let body = json!({ "result": result, "error": null, "id": 1 }).to_string();
        self.script.lock().unwrap().push_back(Ok(body));
    }

    /// Queue an error envelope.
    pub fn enqueue_error(&self, code: i64, message: &str) {
        let body = json!({
            "result": null,
            "error": { "code": code, "message": message },
            "id": 1
        })
        .to_string();
        self.script.lock().unwrap().push_back(Ok(body));
    }

    /// Queue a transport-level failure.
    pub fn enqueue_transport(&self, kind: TransportKind) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(kind, "simulated failure")));
    }

    /// Request bodies recorded so far, parsed.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of dispatches the mock has served.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_request(&self, body: String) -> Result<String, TransportError> {
        let parsed: Value = serde_json::from_str(&body).expect("request body is JSON");
        self.requests.lock().unwrap().push(parsed);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("mock transport script exhausted")
    }
}
