//! Ledger Client Errors

use jsonrpsee::core::ClientError;
use thiserror::Error;

/// Errors from a single validated-ledger fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid ledger endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Ledger request failed: {0}")]
    Transport(String),

    #[error("Upstream returned {error}: {message}")]
    Upstream { error: String, message: String },

    #[error("Malformed ledger response: {0}")]
    Malformed(String),

    #[error("Ledger {0} is not validated")]
    NotValidated(u64),
}

impl LedgerError {
    /// True when the endpoint could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, LedgerError::Transport(_))
    }
}

impl From<ClientError> for LedgerError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::ParseError(e) => LedgerError::Malformed(e.to_string()),
            ClientError::Call(err) => LedgerError::Upstream {
                error: err.code().to_string(),
                message: err.message().to_string(),
            },
            other => LedgerError::Transport(other.to_string()),
        }
    }
}
