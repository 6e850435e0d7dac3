//! JSON-RPC Ledger Client
//!
//! Fetches the validated ledger over HTTP JSON-RPC.

use crate::{
    error::LedgerError,
    types::{LedgerRequest, LedgerResponse, LedgerSummary},
    LedgerSource,
};
use async_trait::async_trait;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use std::time::Duration;

/// JSON-RPC method returning a ledger
pub const LEDGER_METHOD: &str = "ledger";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP JSON-RPC client for the upstream ledger network
pub struct RpcLedgerClient {
    url: String,
    client: HttpClient,
}

impl RpcLedgerClient {
    /// Create a client for `url`
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self, LedgerError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LedgerError::InvalidEndpoint {
                url: url.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }

        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(url)
            .map_err(|e| LedgerError::InvalidEndpoint {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Upstream endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LedgerSource for RpcLedgerClient {
    async fn fetch_validated_ledger(&self) -> Result<LedgerSummary, LedgerError> {
        let response: LedgerResponse = self
            .client
            .request(LEDGER_METHOD, rpc_params![LedgerRequest::validated_with_transactions()])
            .await?;

        let summary = LedgerSummary::from_response(response)?;
        tracing::debug!(
            "Fetched ledger {} ({} txs) from {}",
            summary.ledger_index,
            summary.tx_count,
            self.url
        );

        Ok(summary)
    }
}
