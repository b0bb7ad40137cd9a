// src/directory.rs
// Locally cached validator directory with independent per-peer liveness.
use crate::client::{probe_peer, SeedClient};
use crate::error::Result;
use crate::types::PeerInfo;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Timer and probe settings for the directory.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub sweep_interval: Duration,
    pub probe_timeout: Duration,
}

type PeerStore = Arc<RwLock<Vec<PeerInfo>>>;

/// Owns the cached list of validator peers, loaded from the seed node and
/// kept fresh by a periodic health sweep. Records are keyed by address;
/// only `load`/`refresh` replace the collection, sweeps mutate flags in
/// place.
pub struct PeerDirectory {
    seed: SeedClient,
    client: Client,
    settings: DirectorySettings,
    peers: PeerStore,
    sweep_task: Mutex<Option<JoinHandle<()>>>,
}

impl PeerDirectory {
    pub fn new(seed: SeedClient, client: Client, settings: DirectorySettings) -> Self {
        Self {
            seed,
            client,
            settings,
            peers: Arc::new(RwLock::new(Vec::new())),
            sweep_task: Mutex::new(None),
        }
    }

    /// Fetch the peer listing from the seed node, keep only validators, and
    /// replace the cached collection wholesale. A failed fetch leaves the
    /// previous collection untouched; callers distinguish failure from
    /// "zero validators" by this call's error, never by list length.
    pub async fn load(&self) -> Result<Vec<PeerInfo>> {
        let listed = self.seed.fetch_nodes().await?;
        let total = listed.len();
        let validators: Vec<PeerInfo> = listed.into_iter().filter(|p| p.is_validator()).collect();

        info!(
            "peer directory loaded: {} validators ({} nodes listed)",
            validators.len(),
            total
        );
        *self.peers.write() = validators.clone();
        Ok(validators)
    }

    /// Explicit, externally triggered reload.
    pub async fn refresh(&self) -> Result<Vec<PeerInfo>> {
        debug!("peer directory refresh requested");
        self.load().await
    }

    /// Convenience for startup: a failed first load only warns, the sweep
    /// and later refreshes recover.
    pub async fn load_or_warn(&self) {
        if let Err(e) = self.load().await {
            warn!("initial peer directory load failed: {}", e);
        }
    }

    /// All known peers, in insertion order from the last load.
    pub fn all_peers(&self) -> Vec<PeerInfo> {
        self.peers.read().clone()
    }

    /// The currently responding subset, in insertion order.
    pub fn active_peers(&self) -> Vec<PeerInfo> {
        self.peers
            .read()
            .iter()
            .filter(|p| p.is_responding)
            .cloned()
            .collect()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.read().len()
    }

    /// Ad hoc liveness probe of an arbitrary address. A side-channel query:
    /// it never mutates the directory, whether or not the address is known.
    pub async fn ping_address(&self, address: &str) -> bool {
        probe_peer(&self.client, address, self.settings.probe_timeout).await
    }

    /// Run one health sweep over the current collection.
    pub async fn run_sweep(&self) {
        sweep_once(&self.client, &self.peers, self.settings.probe_timeout).await;
    }

    /// Start the recurring health sweep. Replaces any previous sweep timer.
    pub fn start_sweep_timer(&self) {
        let mut slot = self.sweep_task.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let client = self.client.clone();
        let peers = Arc::clone(&self.peers);
        let settings = self.settings.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(settings.sweep_interval);
            // the freshly loaded listing already carries liveness flags;
            // start sweeping one full period later
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep_once(&client, &peers, settings.probe_timeout).await;
            }
        }));
    }

    /// Stop the sweep timer. Idempotent.
    pub fn stop(&self) {
        if let Some(handle) = self.sweep_task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for PeerDirectory {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Probe every known peer concurrently and apply each result to its own
/// record: a responding peer refreshes `last_seen`, a silent one only drops
/// its flag. Individual probe failures never affect other records and never
/// fail the sweep as a whole.
async fn sweep_once(client: &Client, peers: &PeerStore, probe_timeout: Duration) {
    let targets: Vec<String> = peers.read().iter().map(|p| p.address.clone()).collect();
    if targets.is_empty() {
        debug!("health sweep skipped: no validators known");
        return;
    }

    let probes = targets.into_iter().map(|address| {
        let client = client.clone();
        async move {
            let alive = probe_peer(&client, &address, probe_timeout).await;
            (address, alive)
        }
    });
    let results = join_all(probes).await;

    let mut responding = 0usize;
    {
        let mut records = peers.write();
        for (address, alive) in &results {
            if let Some(record) = records.iter_mut().find(|p| p.address == *address) {
                record.is_responding = *alive;
                if *alive {
                    record.last_seen = Some(Utc::now());
                    responding += 1;
                }
            }
        }
    }

    info!(
        "validator health sweep: {}/{} responding",
        responding,
        results.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_http_client;

    fn test_directory() -> PeerDirectory {
        let client = build_http_client(Duration::from_millis(500)).unwrap();
        let seed = SeedClient::new("127.0.0.1:1", client.clone());
        PeerDirectory::new(
            seed,
            client,
            DirectorySettings {
                sweep_interval: Duration::from_secs(120),
                probe_timeout: Duration::from_millis(200),
            },
        )
    }

    fn peer(address: &str, responding: bool) -> PeerInfo {
        PeerInfo {
            address: address.to_string(),
            node_type: "validator".to_string(),
            last_seen: None,
            is_responding: responding,
            version: None,
        }
    }

    #[test]
    fn test_active_peers_is_responding_subset_in_order() {
        let directory = test_directory();
        *directory.peers.write() = vec![
            peer("10.0.0.1:3001", true),
            peer("10.0.0.2:3001", false),
            peer("10.0.0.3:3001", true),
        ];

        let active = directory.active_peers();
        let addresses: Vec<&str> = active.iter().map(|p| p.address.as_str()).collect();

        assert_eq!(addresses, vec!["10.0.0.1:3001", "10.0.0.3:3001"]);
        assert_eq!(directory.peer_count(), 3);
    }

    #[test]
    fn test_active_peers_empty_when_none_responding() {
        let directory = test_directory();
        *directory.peers.write() = vec![peer("10.0.0.1:3001", false)];

        assert!(directory.active_peers().is_empty());
        assert_eq!(directory.peer_count(), 1);
    }
}
