//! HTTP Server
//!
//! Serves the ledger page and the WebSocket stream that pushes updates to it.

use crate::{
    error::ServerError,
    render::{index_page, ledger_fragment, STREAM_PATH},
    viewers::ViewerRegistry,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, Response},
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use ledger_client::LedgerSource;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Services shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn LedgerSource>,
    pub viewers: Arc<ViewerRegistry>,
}

/// HTTP server for the live ledger page
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(source: Arc<dyn LedgerSource>, viewers: Arc<ViewerRegistry>) -> Self {
        Self {
            state: AppState { source, viewers },
        }
    }

    /// Create the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(handle_index))
            .route("/ledger", get(handle_ledger))
            .route(STREAM_PATH, get(handle_stream))
            .route("/health", get(handle_health))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }

    /// Bind `addr` and serve until the task is dropped
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        tracing::info!("HTTP server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Full page, rendered from a fresh fetch
async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let summary = state.source.fetch_validated_ledger().await?;
    Ok(Html(index_page(&summary)))
}

/// Bare ledger region
async fn handle_ledger(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let summary = state.source.fetch_validated_ledger().await?;
    Ok(Html(ledger_fragment(&summary)))
}

async fn handle_health() -> &'static str {
    "ok"
}

async fn handle_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| viewer_session(socket, state.viewers))
}

/// Forward broadcasts to one browser until either side goes away
async fn viewer_session(socket: WebSocket, viewers: Arc<ViewerRegistry>) {
    let (id, mut updates) = viewers.register();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(message) => {
                    if let Err(e) = ws_sender.send(Message::Text(message.to_string())).await {
                        tracing::debug!("Viewer {} send failed: {}", id, e);
                        break;
                    }
                }
                None => break,
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!("Viewer {} socket error: {}", id, e);
                    break;
                }
                // Browsers never send anything meaningful on this stream
                Some(Ok(_)) => {}
            },
        }
    }

    viewers.unregister(id);
}
