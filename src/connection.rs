// src/connection.rs
// Seed-node connection manager: registration state machine plus the ping
// and bounded-reconnect timers.
use crate::client::SeedClient;
use crate::identity::NodeIdentity;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Registration lifecycle against the seed node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationStatus {
    NotRegistered,
    Registering,
    Registered,
    Failed,
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistrationStatus::NotRegistered => write!(f, "not registered"),
            RegistrationStatus::Registering => write!(f, "registering"),
            RegistrationStatus::Registered => write!(f, "registered"),
            RegistrationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Connection state owned by the manager. Written only by `connect`/`ping`
/// and the two timer callbacks; everything else reads snapshots.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub registration_status: RegistrationStatus,
    pub connected: bool,
    pub last_ping_time: Option<DateTime<Utc>>,
    /// Incremented only while a reconnect timer is active; 0 whenever
    /// reconnection is not in progress.
    pub reconnect_attempts: u32,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            registration_status: RegistrationStatus::NotRegistered,
            connected: false,
            last_ping_time: None,
            reconnect_attempts: 0,
        }
    }
}

/// Timer settings for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub ping_interval: Duration,
    pub reconnect_interval: Duration,
    pub max_reconnect_attempts: u32,
}

/// Everything the timer tasks need: identity, seed client, settings, the
/// shared state and the reconnect-timer slot. Cheap to clone into spawned
/// tasks.
#[derive(Clone)]
struct SeedLink {
    identity: NodeIdentity,
    seed: SeedClient,
    settings: ConnectionSettings,
    state: Arc<RwLock<ConnectionState>>,
    reconnect_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SeedLink {
    /// Ping the seed node and, if reachable, (re-)register this node's
    /// address. Returns `true` only when registration ends up confirmed.
    /// Failures never propagate; they arm the reconnect timer instead.
    async fn connect(&self) -> bool {
        if !self.seed.ping().await {
            debug!("seed node {} did not answer ping", self.seed.base_url());
            self.handle_failure();
            return false;
        }

        {
            let mut state = self.state.write();
            state.connected = true;
            state.last_ping_time = Some(Utc::now());
            state.registration_status = RegistrationStatus::Registering;
        }

        match self.seed.register(&self.identity.address()).await {
            Ok(reply) => {
                {
                    let mut state = self.state.write();
                    state.registration_status = RegistrationStatus::Registered;
                    state.reconnect_attempts = 0;
                }
                self.stop_reconnect_timer();
                info!(
                    "registered {} with seed node {} ({:?})",
                    self.identity.address(),
                    self.seed.base_url(),
                    reply
                );
                true
            }
            Err(e) => {
                warn!("registration with seed node failed: {}", e);
                self.state.write().registration_status = RegistrationStatus::Failed;
                self.handle_failure();
                false
            }
        }
    }

    /// Liveness check. A success refreshes the connected flag and ping
    /// time; losing the connection arms the reconnect timer.
    async fn ping(&self) -> bool {
        if self.seed.ping().await {
            let mut state = self.state.write();
            state.connected = true;
            state.last_ping_time = Some(Utc::now());
            true
        } else {
            let was_connected = {
                let mut state = self.state.write();
                let was = state.connected;
                state.connected = false;
                was
            };
            if was_connected {
                warn!("lost contact with seed node {}", self.seed.base_url());
                self.handle_failure();
            }
            false
        }
    }

    /// Mark the connection lost and arm the reconnect timer if none is
    /// running. Idempotent while a timer is already active.
    fn handle_failure(&self) {
        self.state.write().connected = false;

        let mut slot = self.reconnect_task.lock();
        let running = slot.as_ref().map(|h| !h.is_finished()).unwrap_or(false);
        if running {
            return;
        }

        info!(
            "seed node unreachable, reconnecting every {:?} (up to {} attempts)",
            self.settings.reconnect_interval, self.settings.max_reconnect_attempts
        );
        let link = self.clone();
        *slot = Some(tokio::spawn(async move {
            link.reconnect_loop().await;
        }));
    }

    async fn reconnect_loop(&self) {
        let mut ticker = tokio::time::interval(self.settings.reconnect_interval);
        // interval fires immediately; the first reconnect attempt should
        // wait one full period after the failure
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let attempt = {
                let mut state = self.state.write();
                if state.reconnect_attempts >= self.settings.max_reconnect_attempts {
                    // reconnection is over: the counter goes back to zero
                    // and the next failure re-arms a fresh cycle
                    state.reconnect_attempts = 0;
                    None
                } else {
                    state.reconnect_attempts += 1;
                    Some(state.reconnect_attempts)
                }
            };

            let attempt = match attempt {
                Some(n) => n,
                None => {
                    warn!(
                        "giving up on seed node after {} reconnect attempts",
                        self.settings.max_reconnect_attempts
                    );
                    break;
                }
            };

            debug!(
                "reconnect attempt {}/{}",
                attempt, self.settings.max_reconnect_attempts
            );
            if self.connect().await {
                info!("reconnected to seed node after {} attempt(s)", attempt);
                break;
            }
        }
    }

    fn stop_reconnect_timer(&self) {
        if let Some(handle) = self.reconnect_task.lock().take() {
            handle.abort();
        }
    }
}

/// Owns this node's identity and its connection to the seed node. All
/// network failures are converted to state transitions; nothing here
/// returns an error to the caller.
pub struct ConnectionManager {
    link: SeedLink,
    ping_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(identity: NodeIdentity, seed: SeedClient, settings: ConnectionSettings) -> Self {
        Self {
            link: SeedLink {
                identity,
                seed,
                settings,
                state: Arc::new(RwLock::new(ConnectionState::new())),
                reconnect_task: Arc::new(Mutex::new(None)),
            },
            ping_task: Mutex::new(None),
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.link.identity
    }

    pub fn seed_address(&self) -> &str {
        self.link.seed.base_url()
    }

    /// Snapshot of the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.link.state.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.link.state.read().connected
    }

    pub fn registration_status(&self) -> RegistrationStatus {
        self.link.state.read().registration_status
    }

    pub fn last_ping_time(&self) -> Option<DateTime<Utc>> {
        self.link.state.read().last_ping_time
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.link.state.read().reconnect_attempts
    }

    /// Whether a reconnect timer is currently armed.
    pub fn is_reconnecting(&self) -> bool {
        self.link
            .reconnect_task
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// See [`SeedLink::connect`]: ping + register, failures arm the
    /// reconnect timer and come back as `false`.
    pub async fn connect(&self) -> bool {
        self.link.connect().await
    }

    /// See [`SeedLink::ping`].
    pub async fn ping(&self) -> bool {
        self.link.ping().await
    }

    /// Mark the connection lost and arm the reconnect timer if needed.
    pub fn handle_failure(&self) {
        self.link.handle_failure();
    }

    /// Start the recurring health-check ping. Replaces any previously
    /// running ping timer.
    pub fn start_ping_timer(&self) {
        let mut slot = self.ping_task.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let link = self.link.clone();
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(link.settings.ping_interval);
            // skip the immediate first tick; connect() has just pinged
            ticker.tick().await;
            loop {
                ticker.tick().await;
                // result ignored: the state transitions are what matter
                let _ = link.ping().await;
            }
        }));
    }

    /// Stop both timers. Idempotent; in-flight requests finish or time out
    /// on their own.
    pub fn stop(&self) {
        if let Some(handle) = self.ping_task.lock().take() {
            handle.abort();
        }
        self.link.stop_reconnect_timer();
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
