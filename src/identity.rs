// src/identity.rs
use serde::{Deserialize, Serialize};

/// This node's identity on the network: host and port, combined into the
/// externally visible address peers register and probe. Immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub host: String,
    pub port: u16,
}

impl NodeIdentity {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The address advertised to the seed node and other peers.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address())
    }
}
