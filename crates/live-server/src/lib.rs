//! Live Server - Live-updating ledger page
//!
//! - HTTP: the ledger page, the bare ledger region and a health probe
//! - WebSocket: Turbo Stream updates pushed to every open page
//! - Updater: background task polling the ledger and broadcasting changes

pub mod error;
pub mod http_server;
pub mod render;
pub mod updater;
pub mod viewers;

pub use error::ServerError;
pub use http_server::{AppState, HttpServer};
pub use updater::{LiveUpdater, DEFAULT_POLL_INTERVAL};
pub use viewers::{BroadcastReport, ViewerId, ViewerRegistry};
