//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledger_client::LedgerError;
use thiserror::Error;

/// Errors surfaced to page requests
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Ledger unavailable: {0}")]
    Upstream(#[from] LedgerError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Upstream(e) => {
                tracing::warn!("Page request failed upstream: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };

        (status, self.to_string()).into_response()
    }
}
