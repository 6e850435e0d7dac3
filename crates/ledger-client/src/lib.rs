//! Ledger Client - Reads the latest validated ledger
//!
//! Talks to an XRPL-style JSON-RPC endpoint:
//! - Requests the validated ledger with its transaction list
//! - Condenses the response into a `LedgerSummary` for display

pub mod client;
pub mod error;
pub mod types;

pub use client::{RpcLedgerClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::LedgerError;
pub use types::{LedgerData, LedgerResponse, LedgerSummary};

use async_trait::async_trait;

/// Default upstream endpoint (XRPL Labs testnet)
pub const DEFAULT_RPC_URL: &str = "https://testnet.xrpl-labs.com/";

/// Anything that can produce a summary of the latest validated ledger.
///
/// Consumers hold this behind an `Arc<dyn LedgerSource>` so the HTTP
/// handlers and the update loop share one client, and tests can swap in
/// scripted sources.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Fetch the validated ledger and summarize it.
    ///
    /// Performs exactly one upstream call. Errors are not retried here.
    async fn fetch_validated_ledger(&self) -> Result<LedgerSummary, LedgerError>;
}
