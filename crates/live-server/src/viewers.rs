//! Viewer Registry - Tracks open live-update sessions
//!
//! Each connected browser gets a bounded queue. Broadcasts never wait on a
//! viewer: a full queue drops that viewer's update, a closed queue removes
//! the viewer.

use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Viewer session ID
pub type ViewerId = u64;

/// Pending updates a single viewer may hold before updates are dropped
pub const VIEWER_QUEUE_CAPACITY: usize = 16;

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Viewers that accepted the update
    pub delivered: usize,
    /// Viewers whose queue was full
    pub dropped: usize,
    /// Viewers found closed and removed
    pub disconnected: usize,
}

/// Registry of connected viewers
pub struct ViewerRegistry {
    viewers: DashMap<ViewerId, mpsc::Sender<Arc<str>>>,
    next_id: AtomicU64,
}

impl ViewerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            viewers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new viewer and return its update stream
    pub fn register(&self) -> (ViewerId, mpsc::Receiver<Arc<str>>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::channel(VIEWER_QUEUE_CAPACITY);

        self.viewers.insert(id, sender);
        tracing::debug!("Registered viewer {} ({} connected)", id, self.viewers.len());

        (id, receiver)
    }

    /// Remove a viewer
    pub fn unregister(&self, id: ViewerId) -> bool {
        if self.viewers.remove(&id).is_some() {
            tracing::debug!("Removed viewer {} ({} connected)", id, self.viewers.len());
            true
        } else {
            false
        }
    }

    /// Send `message` to every viewer connected right now
    pub fn broadcast(&self, message: Arc<str>) -> BroadcastReport {
        // Snapshot first so no shard lock is held while sending or removing
        let snapshot: Vec<(ViewerId, mpsc::Sender<Arc<str>>)> = self
            .viewers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, sender) in snapshot {
            match sender.try_send(message.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Viewer {} is behind, dropping update", id);
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    self.viewers.remove(&id);
                    report.disconnected += 1;
                }
            }
        }

        report
    }

    /// Number of connected viewers
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Check if a viewer is registered
    pub fn contains(&self, id: ViewerId) -> bool {
        self.viewers.contains_key(&id)
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
