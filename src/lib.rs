pub mod api;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod connection;
pub mod directory;
pub mod error;
pub mod identity;
pub mod node;
pub mod types;

pub use broadcast::{BroadcastEngine, BroadcastOutcome, BroadcastSummary};
pub use client::{RegistrationReply, SeedClient};
pub use config::{ConfigReport, GatewayConfig};
pub use connection::{ConnectionManager, ConnectionSettings, ConnectionState, RegistrationStatus};
pub use directory::{DirectorySettings, PeerDirectory};
pub use error::{GatewayError, Result};
pub use identity::NodeIdentity;
pub use node::{GatewayNode, NodeStatus};
pub use types::{
    ChainStatus, CriticalProcess, MempoolStatus, PeerInfo, Priority, RequestClass, Transaction,
    TransactionBatch,
};

/// Crate version, reported in the node status.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
