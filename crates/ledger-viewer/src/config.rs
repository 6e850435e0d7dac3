//! Viewer Configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default HTTP bind address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Upstream JSON-RPC endpoint
    pub rpc_url: String,
    /// Seconds between ledger refreshes
    pub poll_interval_secs: u64,
    /// HTTP bind address
    pub bind_addr: String,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ViewerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            bail!("rpc url must be http:// or https://, got {}", self.rpc_url);
        }
        if self.poll_interval_secs == 0 {
            bail!("poll interval must be at least one second");
        }
        if self.request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rpc_url: ledger_client::DEFAULT_RPC_URL.to_string(),
            poll_interval_secs: live_server::DEFAULT_POLL_INTERVAL.as_secs(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            request_timeout_secs: ledger_client::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}
