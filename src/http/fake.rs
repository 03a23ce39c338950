//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::{PortalError, Result};
use crate::http::transport::{ApiRequest, ApiTransport, RawResponse};

#[derive(Clone)]
enum Reply {
    Raw(RawResponse),
    NetworkDown,
}

#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<ApiRequest>>,
    gate: Option<Arc<Semaphore>>,
    holds: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for a permit on the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let transport = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (transport, gate)
    }

    /// Calls to this route wait for a permit on the returned semaphore;
    /// other routes answer straight away.
    pub fn hold(&self, method: &str, path: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.holds
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), Arc::clone(&gate));
        gate
    }

    fn push(&self, method: &str, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(reply);
    }

    /// Queue a reply; the last reply for a route repeats.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.push(method, path, Reply::Raw(RawResponse { status, body }));
    }

    pub fn fail(&self, method: &str, path: &str) {
        self.push(method, path, Reply::NetworkDown);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method.as_str() == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl ApiTransport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let route = format!("{} {}", request.method, request.path);
        self.requests.lock().unwrap().push(request);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let hold = self.holds.lock().unwrap().get(&route).cloned();
        if let Some(hold) = hold {
            hold.acquire().await.unwrap().forget();
        }

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&route) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Raw(raw)) => Ok(raw),
            Some(Reply::NetworkDown) => Err(PortalError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            None => Ok(RawResponse {
                status: 404,
                body: serde_json::json!({ "success": false, "message": format!("no route {route}") }),
            }),
        }
    }
}
