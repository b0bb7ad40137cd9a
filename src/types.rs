// src/types.rs
// Wire types shared with seed nodes and validator peers. Field names follow
// the network's JSON contract (camelCase), so every struct here carries a
// serde rename.
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node type tag used by the seed node's peer listing. Only validator
/// entries are retained in the local directory.
pub const VALIDATOR_NODE_TYPE: &str = "validator";

/// A single value transfer submitted by a client and fanned out to validators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender address
    pub from: String,

    /// Recipient address
    pub to: String,

    /// Amount to transfer
    pub amount: u64,

    /// Signature over the transfer, verified by validators (opaque here)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a new unsigned transaction stamped with the current time.
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            signature: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// Attach a signature
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// A batch of transactions dispatched in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBatch {
    pub transactions: Vec<Transaction>,
}

impl TransactionBatch {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// Priority class attached to a critical process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Critical
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

/// A priority work item routed through the dedicated `/critical` endpoint.
/// `data` is a caller-supplied blob passed through without interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalProcess {
    pub process_id: String,

    pub data: serde_json::Value,

    #[serde(default)]
    pub priority: Priority,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CriticalProcess {
    /// Create a new critical process with a generated id and current timestamp.
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            process_id: Uuid::new_v4().to_string(),
            data,
            priority: Priority::default(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn with_id(mut self, process_id: impl Into<String>) -> Self {
        self.process_id = process_id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Peer descriptor as served by the seed node's `/nodes` listing, and the
/// record shape cached in the local peer directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    /// Peer address (`host:port`), unique within a directory
    pub address: String,

    /// Node type tag (`validator`, `seed`, ...)
    pub node_type: String,

    /// Last time the peer answered a liveness probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    /// Whether the most recent probe succeeded
    #[serde(default)]
    pub is_responding: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PeerInfo {
    pub fn is_validator(&self) -> bool {
        self.node_type == VALIDATOR_NODE_TYPE
    }
}

/// Chain head summary returned by a validator's `/status/*` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub height: u64,
    pub last_block_hash: String,
    pub difficulty: u64,
    pub total_transactions: u64,
}

/// Mempool summary returned by a validator's `/mempool/*` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolStatus {
    pub pending_transactions: u64,
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_transaction: Option<DateTime<Utc>>,
}

/// Request class for pull-style queries: validators keep separate status and
/// mempool views for plain transactions and critical processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Tx,
    Critical,
}

impl RequestClass {
    /// Path segment used by the validator endpoints (`/status/tx`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Tx => "tx",
            RequestClass::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RequestClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tx" => Ok(RequestClass::Tx),
            "critical" => Ok(RequestClass::Critical),
            _ => bail!("Invalid request class: {}", s),
        }
    }
}
