// src/broadcast.rs
// Scatter/gather fan-out: one request per peer, dispatched concurrently,
// settled into exactly one outcome per peer regardless of how each call
// ends. The engine keeps no state between calls.
use crate::client::peer_url;
use crate::types::PeerInfo;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one dispatch to one peer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastOutcome {
    pub peer_address: String,
    pub success: bool,

    /// Peer's response body, when it answered with one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl BroadcastOutcome {
    fn ok(peer_address: String, data: Option<JsonValue>) -> Self {
        Self {
            peer_address,
            success: true,
            data,
            error: None,
            timestamp: Utc::now(),
        }
    }

    fn failed(peer_address: String, error: String) -> Self {
        Self {
            peer_address,
            success: false,
            data: None,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregated fan-out result: outcomes in input peer order plus summary
/// counts. An empty summary (0/0) means there was nothing to broadcast to,
/// which is a valid steady state, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSummary {
    pub outcomes: Vec<BroadcastOutcome>,
    pub success_count: usize,
    pub total: usize,
}

impl BroadcastSummary {
    pub fn empty() -> Self {
        Self {
            outcomes: Vec::new(),
            success_count: 0,
            total: 0,
        }
    }

    fn from_outcomes(outcomes: Vec<BroadcastOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        let total = outcomes.len();
        Self {
            outcomes,
            success_count,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Stateless fan-out engine over a shared HTTP client. The same operation
/// serves every request shape; only endpoint path, payload and deadline
/// vary.
#[derive(Clone)]
pub struct BroadcastEngine {
    client: Client,
}

impl BroadcastEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// POST `payload` to `path` on every peer concurrently.
    pub async fn post<T: Serialize>(
        &self,
        peers: &[PeerInfo],
        path: &str,
        payload: &T,
        deadline: Duration,
    ) -> crate::error::Result<BroadcastSummary> {
        let body = serde_json::to_value(payload)?;
        Ok(self.fan_out(peers, path, Some(body), deadline).await)
    }

    /// GET `path` from every peer concurrently (pull-style queries).
    pub async fn get(&self, peers: &[PeerInfo], path: &str, deadline: Duration) -> BroadcastSummary {
        self.fan_out(peers, path, None, deadline).await
    }

    /// The single parameterized dispatch: every call settles, a failing
    /// peer never blocks or discards the others, and the aggregate keeps
    /// the input peer order.
    async fn fan_out(
        &self,
        peers: &[PeerInfo],
        path: &str,
        body: Option<JsonValue>,
        deadline: Duration,
    ) -> BroadcastSummary {
        if peers.is_empty() {
            debug!("broadcast to {} skipped: no active validators", path);
            return BroadcastSummary::empty();
        }

        let calls = peers.iter().map(|peer| {
            let client = self.client.clone();
            let address = peer.address.clone();
            let url = peer_url(&peer.address, path);
            let body = body.clone();
            async move { dispatch_one(client, address, url, body, deadline).await }
        });
        let outcomes = join_all(calls).await;

        let summary = BroadcastSummary::from_outcomes(outcomes);
        if summary.success_count < summary.total {
            warn!(
                "broadcast to {}: {}/{} peers succeeded",
                path, summary.success_count, summary.total
            );
        } else {
            debug!(
                "broadcast to {}: {}/{} peers succeeded",
                path, summary.success_count, summary.total
            );
        }
        summary
    }
}

async fn dispatch_one(
    client: Client,
    peer_address: String,
    url: String,
    body: Option<JsonValue>,
    deadline: Duration,
) -> BroadcastOutcome {
    let request = match &body {
        Some(payload) => client.post(&url).json(payload),
        None => client.get(&url),
    };

    match request.timeout(deadline).send().await {
        Ok(response) if response.status().is_success() => {
            let data = response.json::<JsonValue>().await.ok();
            BroadcastOutcome::ok(peer_address, data)
        }
        Ok(response) => {
            BroadcastOutcome::failed(peer_address, format!("HTTP {}", response.status()))
        }
        Err(e) if e.is_timeout() => BroadcastOutcome::failed(
            peer_address,
            format!("request timed out after {}ms", deadline.as_millis()),
        ),
        Err(e) => BroadcastOutcome::failed(peer_address, e.to_string()),
    }
}
