#![allow(dead_code)]

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use sumo_log_shipper::sender::{OutboundRequest, Transport, TransportError, TransportResponse};
use tokio::sync::Semaphore;

/// In-memory transport that records every request.
///
/// With `gated()`, each POST waits for a permit from `release()` before
/// answering, which keeps a send in flight for as long as a test needs.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<OutboundRequest>>,
    fail: AtomicBool,
    gate: Option<Semaphore>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.body.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Transport for RecordingTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| TransportError::Other(e.to_string()))?
                .forget();
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Status {
                status: 503,
                status_text: "Service Unavailable".to_string(),
                body: String::new(),
            });
        }

        Ok(TransportResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            body: String::new(),
        })
    }
}

/// Transport that tracks how many POSTs overlap and collects every delivered
/// line. Each POST yields a few times so other tasks get to run mid-send.
#[derive(Default)]
pub struct ConcurrencyTransport {
    active: AtomicUsize,
    max_active: AtomicUsize,
    lines: Mutex<Vec<String>>,
}

impl ConcurrencyTransport {
    pub fn max_concurrent_posts(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn delivered_lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl Transport for ConcurrencyTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.lines
            .lock()
            .extend(request.body.split('\n').map(str::to_string));
        self.active.fetch_sub(1, Ordering::SeqCst);

        Ok(TransportResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            body: String::new(),
        })
    }
}

/// Waits until `condition` holds, polling every few milliseconds.
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
