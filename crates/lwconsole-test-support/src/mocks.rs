//! Fake transports for exercising the console services without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use lwconsole_core::{AuthHeader, HttpResponse, HttpTransport, TransportError};
use serde_json::{Value, json};
use tokio::sync::Notify;
use url::Url;

/// A request observed by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Requested URL.
    pub url: String,
    /// `Authorization` header value.
    pub authorization: String,
}

/// Transport that records requests and replays scripted outcomes.
///
/// When no outcome is queued it answers `200` with [`default_body`]. With a
/// gate installed, each request waits for [`RecordingTransport::release`]
/// before answering.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    gate: Option<Notify>,
    started: AtomicUsize,
}

impl RecordingTransport {
    /// Transport answering every request with the default body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose requests block until [`Self::release`] is called.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    /// Queue the outcome for the next request.
    pub fn push_outcome(&self, outcome: Result<HttpResponse, TransportError>) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
    }

    /// Queue a failure for the next request.
    pub fn push_failure(&self, error: TransportError) {
        self.push_outcome(Err(error));
    }

    /// Let every waiting request proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_waiters();
        }
    }

    /// Number of requests that have reached the transport.
    #[must_use]
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Requests observed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Body returned when no outcome is queued.
#[must_use]
pub fn default_body() -> Value {
    json!({
        "result": [{
            "dn": "cn=schemacontext",
            "attributes": [{ "type": "objectclass", "value": ["top", "dseroot"] }]
        }]
    })
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn get(&self, url: &Url, header: &AuthHeader) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                authorization: header.value().to_string(),
            });

        if let Some(gate) = &self.gate {
            let released = gate.notified();
            self.started.fetch_add(1, Ordering::SeqCst);
            released.await;
        } else {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        let queued = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        queued.unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                body: default_body(),
            })
        })
    }
}
