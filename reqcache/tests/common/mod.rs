//! Shared transport stubs for the orchestrator tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use reqcache::{Body, BodyKind, Transport, TransportError, TransportRequest, TransportResponse};
use tokio::sync::oneshot;

pub type TransportResult = Result<TransportResponse, TransportError>;

pub fn json_response(status: u16, body: serde_json::Value) -> TransportResponse {
    TransportResponse {
        status: StatusCode::from_u16(status).unwrap(),
        body: Body::Json(body),
        kind: Some(BodyKind::Json),
    }
}

/// Transport stub that resolves immediately, replaying a queue of responses
/// and then repeating the last one. Records every request it sees.
pub struct StubTransport {
    calls: AtomicUsize,
    queue: Mutex<VecDeque<TransportResult>>,
    fallback: TransportResult,
    pub requests: Mutex<Vec<TransportRequest>>,
}

impl StubTransport {
    pub fn always(response: TransportResponse) -> Self {
        StubTransport {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(VecDeque::new()),
            fallback: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        StubTransport {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn sequence(responses: Vec<TransportResponse>) -> Self {
        let fallback = Ok(responses.last().expect("sequence may not be empty").clone());
        StubTransport {
            calls: AtomicUsize::new(0),
            queue: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for &'static StubTransport {
    async fn send(&self, request: TransportRequest) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Transport whose calls resolve only when the test releases them: the
/// n-th call awaits the n-th gate.
pub struct GatedTransport {
    calls: AtomicUsize,
    gates: Mutex<VecDeque<oneshot::Receiver<TransportResult>>>,
}

impl GatedTransport {
    /// Builds a transport expecting `slots` calls, returning one sender
    /// per expected call.
    pub fn with_slots(slots: usize) -> (Self, Vec<oneshot::Sender<TransportResult>>) {
        let mut senders = Vec::with_capacity(slots);
        let mut receivers = VecDeque::with_capacity(slots);
        for _ in 0..slots {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        (
            GatedTransport {
                calls: AtomicUsize::new(0),
                gates: Mutex::new(receivers),
            },
            senders,
        )
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for &'static GatedTransport {
    async fn send(&self, _request: TransportRequest) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .expect("more transport calls than gates");
        gate.await.expect("gate sender dropped")
    }
}

/// Polls `cond` until it holds, panicking after a bounded wait.
pub async fn wait_for(mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within bounded wait");
}

/// Leaks a transport so its state stays inspectable after the orchestrator
/// takes ownership.
pub fn leak<T>(transport: T) -> &'static T {
    Box::leak(Box::new(transport))
}
