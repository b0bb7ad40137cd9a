// src/client.rs
// HTTP plumbing: the seed-node client and the shared outbound client all
// components dispatch through.
use crate::error::{GatewayError, Result};
use crate::types::PeerInfo;
use reqwest::{redirect, Client, StatusCode};
use std::time::Duration;

/// Build the shared outbound HTTP client. Timeout and redirect policy are
/// fixed configuration; per-request deadlines override the default timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::none())
        .build()?;
    Ok(client)
}

/// Base URL for a peer address, accepting both bare `host:port` and
/// already-schemed addresses.
pub fn peer_base_url(address: &str) -> String {
    let trimmed = address.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Full URL for an endpoint on a peer.
pub fn peer_url(address: &str, path: &str) -> String {
    format!("{}{}", peer_base_url(address), path)
}

/// Liveness probe against an arbitrary peer. Success iff the peer answers
/// `GET /ping` with 2xx inside the deadline; every failure mode collapses
/// to `false`.
pub async fn probe_peer(client: &Client, address: &str, deadline: Duration) -> bool {
    let url = peer_url(address, "/ping");
    match client.get(&url).timeout(deadline).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Outcome of a registration call against the seed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationReply {
    /// HTTP 201: the seed node created a new registration
    Created,
    /// HTTP 200: the seed node already knew this address
    AlreadyRegistered,
}

/// Client for the well-known seed node.
#[derive(Clone)]
pub struct SeedClient {
    base_url: String,
    client: Client,
}

impl SeedClient {
    pub fn new(seed_addr: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: peer_base_url(&seed_addr.into()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness check. Success iff HTTP 200; errors collapse to `false`.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/ping", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Register this node's address. The body is the address as a JSON
    /// string; 201 means newly registered, 200 means already registered.
    pub async fn register(&self, address: &str) -> Result<RegistrationReply> {
        let url = format!("{}/register", self.base_url);
        let response = self.client.post(&url).json(&address).send().await?;

        match response.status() {
            StatusCode::CREATED => Ok(RegistrationReply::Created),
            StatusCode::OK => Ok(RegistrationReply::AlreadyRegistered),
            status => Err(GatewayError::Registration(format!(
                "seed node rejected registration: HTTP {}",
                status
            ))),
        }
    }

    /// Fetch the full peer listing.
    pub async fn fetch_nodes(&self) -> Result<Vec<PeerInfo>> {
        let url = format!("{}/nodes", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::SeedNode(format!(
                "peer listing failed: HTTP {}",
                response.status()
            )));
        }

        let peers: Vec<PeerInfo> = response.json().await?;
        Ok(peers)
    }

    /// Fetch the seed node's pre-filtered list of currently responding peers.
    pub async fn fetch_active_nodes(&self) -> Result<Vec<PeerInfo>> {
        let url = format!("{}/nodes/active", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::SeedNode(format!(
                "active peer listing failed: HTTP {}",
                response.status()
            )));
        }

        let peers: Vec<PeerInfo> = response.json().await?;
        Ok(peers)
    }
}
