// src/config.rs
// Environment-driven configuration and startup validation
use log::{error, info, warn};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read from the environment with stated defaults.
/// CLI flags may override individual fields before validation.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// This node's advertised host
    pub host: String,
    /// This node's advertised port
    pub port: u16,
    /// Seed node address (`host:port`)
    pub seed_addr: String,
    /// Local API listen address
    pub api_addr: String,
    /// Seed health-check ping period
    pub ping_interval: Duration,
    /// Reconnect attempt period
    pub reconnect_interval: Duration,
    /// Bounded-retry ceiling for reconnection
    pub max_reconnect_attempts: u32,
    /// Validator health sweep period
    pub sweep_interval: Duration,
    /// Default outbound request timeout
    pub http_timeout: Duration,
    /// Pull-query timeout (status / mempool)
    pub status_timeout: Duration,
    /// Critical-process dispatch timeout
    pub critical_timeout: Duration,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            seed_addr: "127.0.0.1:4000".to_string(),
            api_addr: "0.0.0.0:8080".to_string(),
            ping_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 10,
            sweep_interval: Duration::from_secs(120),
            http_timeout: Duration::from_millis(5000),
            status_timeout: Duration::from_millis(3000),
            critical_timeout: Duration::from_millis(10000),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("NODE_HOST").unwrap_or(defaults.host),
            port: env_or("NODE_PORT", defaults.port),
            seed_addr: env::var("SEED_NODE_ADDR").unwrap_or(defaults.seed_addr),
            api_addr: env::var("API_ADDR").unwrap_or(defaults.api_addr),
            ping_interval: Duration::from_secs(env_or("PING_INTERVAL_SECS", 30)),
            reconnect_interval: Duration::from_secs(env_or("RECONNECT_INTERVAL_SECS", 5)),
            max_reconnect_attempts: env_or("MAX_RECONNECT_ATTEMPTS", defaults.max_reconnect_attempts),
            sweep_interval: Duration::from_secs(env_or("PEER_SWEEP_INTERVAL_SECS", 120)),
            http_timeout: Duration::from_millis(env_or("HTTP_TIMEOUT_MS", 5000)),
            status_timeout: Duration::from_millis(env_or("STATUS_TIMEOUT_MS", 3000)),
            critical_timeout: Duration::from_millis(env_or("CRITICAL_TIMEOUT_MS", 10000)),
        }
    }

    /// Validate the configuration, collecting warnings and hard errors.
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::new();

        if self.port == 0 {
            report.add_error("NODE_PORT cannot be 0".into());
        }

        if !looks_like_host_port(&self.seed_addr) {
            report.add_error(format!(
                "SEED_NODE_ADDR has invalid format: '{}' (expected HOST:PORT)",
                self.seed_addr
            ));
        }

        if self.api_addr.parse::<std::net::SocketAddr>().is_err() {
            report.add_error(format!(
                "API_ADDR has invalid format: '{}' (expected IP:PORT)",
                self.api_addr
            ));
        }

        if self.ping_interval.is_zero() {
            report.add_error("PING_INTERVAL_SECS must be at least 1".into());
        }
        if self.reconnect_interval.is_zero() {
            report.add_error("RECONNECT_INTERVAL_SECS must be at least 1".into());
        }
        if self.sweep_interval.is_zero() {
            report.add_error("PEER_SWEEP_INTERVAL_SECS must be at least 1".into());
        }

        if self.max_reconnect_attempts == 0 {
            report.add_warning(
                "MAX_RECONNECT_ATTEMPTS is 0 - the node will never retry a lost seed connection"
                    .into(),
            );
        }

        if self.sweep_interval < self.ping_interval {
            report.add_warning(
                "PEER_SWEEP_INTERVAL_SECS is shorter than PING_INTERVAL_SECS - health sweeps are low-priority telemetry and usually run far less often".into(),
            );
        }

        if self.status_timeout > self.critical_timeout {
            report.add_warning(
                "STATUS_TIMEOUT_MS exceeds CRITICAL_TIMEOUT_MS - status queries are expected to be the cheaper call".into(),
            );
        }

        report
    }
}

/// Accepts `host:port` where host may be a name, so a full SocketAddr parse
/// is too strict here.
fn looks_like_host_port(addr: &str) -> bool {
    match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    }
}

/// Validation result for configuration checks
pub struct ConfigReport {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigReport {
    fn new() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
        self.valid = false;
    }

    pub fn print_summary(&self) {
        if !self.warnings.is_empty() {
            warn!("Configuration warnings:");
            for w in &self.warnings {
                warn!(" - {}", w);
            }
        }

        if !self.errors.is_empty() {
            error!("Configuration errors:");
            for e in &self.errors {
                error!(" - {}", e);
            }
        }

        if self.valid && self.warnings.is_empty() {
            info!("Configuration validation passed");
        }
    }
}
