// src/node.rs
// Gateway node facade: wires the connection manager, peer directory and
// broadcast engine together and exposes the operations the API layer maps
// onto.
use crate::broadcast::{BroadcastEngine, BroadcastSummary};
use crate::client::{build_http_client, SeedClient};
use crate::config::GatewayConfig;
use crate::connection::{ConnectionManager, ConnectionSettings, RegistrationStatus};
use crate::directory::{DirectorySettings, PeerDirectory};
use crate::error::Result;
use crate::identity::NodeIdentity;
use crate::types::{CriticalProcess, PeerInfo, RequestClass, Transaction, TransactionBatch};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Connection-state snapshot served by `GET /status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub connected: bool,
    pub node_address: String,
    pub seed_node_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ping_time: Option<DateTime<Utc>>,
    pub registration_status: RegistrationStatus,
    pub known_peers: usize,
    pub active_peers: usize,
    pub version: String,
}

pub struct GatewayNode {
    config: GatewayConfig,
    connection: ConnectionManager,
    directory: PeerDirectory,
    engine: BroadcastEngine,
}

impl GatewayNode {
    pub fn new(config: GatewayConfig) -> Result<Arc<Self>> {
        let client = build_http_client(config.http_timeout)?;
        let identity = NodeIdentity::new(config.host.clone(), config.port);
        let seed = SeedClient::new(config.seed_addr.clone(), client.clone());

        let connection = ConnectionManager::new(
            identity,
            seed.clone(),
            ConnectionSettings {
                ping_interval: config.ping_interval,
                reconnect_interval: config.reconnect_interval,
                max_reconnect_attempts: config.max_reconnect_attempts,
            },
        );
        let directory = PeerDirectory::new(
            seed,
            client.clone(),
            DirectorySettings {
                sweep_interval: config.sweep_interval,
                probe_timeout: config.status_timeout,
            },
        );
        let engine = BroadcastEngine::new(client);

        Ok(Arc::new(Self {
            config,
            connection,
            directory,
            engine,
        }))
    }

    /// Bring the node up: initial seed registration (failures arm the
    /// reconnect timer), then the recurring timers, then the first peer
    /// load.
    pub async fn start(&self) {
        info!(
            "starting gateway node {} (seed {})",
            self.connection.identity().address(),
            self.connection.seed_address()
        );

        self.connection.connect().await;
        self.connection.start_ping_timer();

        self.directory.load_or_warn().await;
        self.directory.start_sweep_timer();
    }

    /// Stop every timer before releasing anything else; in-flight calls
    /// finish or time out naturally.
    pub fn shutdown(&self) {
        self.connection.stop();
        self.directory.stop();
        info!("gateway node stopped");
    }

    // --- read accessors for the API layer ---

    pub fn status(&self) -> NodeStatus {
        let state = self.connection.state();
        NodeStatus {
            connected: state.connected,
            node_address: self.connection.identity().address(),
            seed_node_address: self.connection.seed_address().to_string(),
            last_ping_time: state.last_ping_time,
            registration_status: state.registration_status,
            known_peers: self.directory.peer_count(),
            active_peers: self.directory.active_peers().len(),
            version: crate::VERSION.to_string(),
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn directory(&self) -> &PeerDirectory {
        &self.directory
    }

    pub fn peers(&self) -> Vec<PeerInfo> {
        self.directory.all_peers()
    }

    pub fn active_peers(&self) -> Vec<PeerInfo> {
        self.directory.active_peers()
    }

    pub async fn refresh_peers(&self) -> Result<Vec<PeerInfo>> {
        self.directory.refresh().await
    }

    pub async fn ping_peer(&self, address: &str) -> bool {
        self.directory.ping_address(address).await
    }

    // --- broadcast operations (one engine, four request shapes) ---

    pub async fn broadcast_transaction(&self, tx: &Transaction) -> Result<BroadcastSummary> {
        self.engine
            .post(&self.active_peers(), "/tx", tx, self.config.http_timeout)
            .await
    }

    pub async fn broadcast_batch(&self, batch: &TransactionBatch) -> Result<BroadcastSummary> {
        self.engine
            .post(
                &self.active_peers(),
                "/tx/batch",
                batch,
                self.config.http_timeout,
            )
            .await
    }

    pub async fn broadcast_critical(&self, process: &CriticalProcess) -> Result<BroadcastSummary> {
        self.engine
            .post(
                &self.active_peers(),
                "/critical",
                process,
                self.config.critical_timeout,
            )
            .await
    }

    pub async fn query_status(&self, class: RequestClass) -> BroadcastSummary {
        self.engine
            .get(
                &self.active_peers(),
                &format!("/status/{}", class),
                self.config.status_timeout,
            )
            .await
    }

    pub async fn query_mempool(&self, class: RequestClass) -> BroadcastSummary {
        self.engine
            .get(
                &self.active_peers(),
                &format!("/mempool/{}", class),
                self.config.status_timeout,
            )
            .await
    }
}
