//! Live Updater - Periodic fetch, render and broadcast
//!
//! Every `interval` the updater fetches the validated ledger, renders the
//! ledger region and pushes it to all viewers as a Turbo Stream replace.
//! Failed ticks are logged and skipped; the next tick runs on schedule.

use crate::{
    render::{ledger_fragment, turbo_replace, LEDGER_TARGET},
    viewers::{BroadcastReport, ViewerRegistry},
};
use futures::FutureExt;
use ledger_client::{LedgerError, LedgerSource};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tokio::task::JoinHandle;

/// Default delay between ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Background ledger poller
pub struct LiveUpdater {
    source: Arc<dyn LedgerSource>,
    viewers: Arc<ViewerRegistry>,
    interval: Duration,
}

impl LiveUpdater {
    /// Create a new updater
    pub fn new(
        source: Arc<dyn LedgerSource>,
        viewers: Arc<ViewerRegistry>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            viewers,
            interval,
        }
    }

    /// Delay between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch, render and broadcast once
    pub async fn tick(&self) -> Result<BroadcastReport, LedgerError> {
        let summary = self.source.fetch_validated_ledger().await?;
        let stream = turbo_replace(LEDGER_TARGET, &ledger_fragment(&summary));

        let report = self.viewers.broadcast(Arc::from(stream));
        tracing::debug!(
            "Ledger {} pushed to {} viewers ({} dropped, {} disconnected)",
            summary.ledger_index,
            report.delivered,
            report.dropped,
            report.disconnected
        );

        Ok(report)
    }

    /// Tick forever, sleeping `interval` before each tick
    pub async fn run(&self) {
        let mut consecutive_failures: u64 = 0;

        loop {
            tokio::time::sleep(self.interval).await;

            match self.tick().await {
                Ok(_) => {
                    if consecutive_failures > 0 {
                        tracing::info!(
                            "Ledger updates recovered after {} failed ticks",
                            consecutive_failures
                        );
                    }
                    consecutive_failures = 0;
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        consecutive_failures,
                        "Skipping ledger update: {}",
                        e
                    );
                }
            }
        }
    }

    /// Start the loop in a supervised task.
    ///
    /// A panic inside the loop is logged and the loop restarted. Aborting the
    /// returned handle stops it.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tracing::info!("Live updater started ({:?} interval)", self.interval);

        tokio::spawn(async move {
            loop {
                match AssertUnwindSafe(self.run()).catch_unwind().await {
                    Ok(()) => tracing::warn!("Live updater returned, restarting"),
                    Err(panic) => tracing::error!(
                        "Live updater panicked: {}, restarting",
                        panic_message(panic.as_ref())
                    ),
                }
            }
        })
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ledger_client::LedgerSummary;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(5);

    /// Source whose Nth call (1-based) can fail or panic
    #[derive(Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        fail_on: Option<usize>,
        panic_on: Option<usize>,
    }

    impl ScriptedSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerSource for ScriptedSource {
        async fn fetch_validated_ledger(&self) -> Result<LedgerSummary, LedgerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on == Some(call) {
                return Err(LedgerError::Transport("connection refused".to_string()));
            }
            if self.panic_on == Some(call) {
                panic!("scripted panic on call {}", call);
            }
            Ok(LedgerSummary {
                close_time_human: "2024-Mar-05 17:21:40.000000000 UTC".to_string(),
                ledger_hash: format!("{:064X}", call),
                ledger_index: 1000 + call as u64,
                tx_count: call,
            })
        }
    }

    fn updater(source: Arc<ScriptedSource>, viewers: Arc<ViewerRegistry>) -> Arc<LiveUpdater> {
        Arc::new(LiveUpdater::new(source, viewers, INTERVAL))
    }

    #[tokio::test]
    async fn test_tick_broadcasts_turbo_stream() {
        let source = Arc::new(ScriptedSource::default());
        let viewers = Arc::new(ViewerRegistry::new());
        let (_id, mut rx) = viewers.register();

        let report = updater(source, viewers).tick().await.unwrap();
        assert_eq!(report.delivered, 1);

        let message = rx.recv().await.unwrap();
        assert!(message.starts_with(r#"<turbo-stream action="replace" target="ledger">"#));
        assert!(message.contains("1001"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_intervals_yield_n_broadcasts() {
        let source = Arc::new(ScriptedSource::default());
        let viewers = Arc::new(ViewerRegistry::new());
        let (_id, mut rx) = viewers.register();

        let start = Instant::now();
        let handle = updater(source.clone(), viewers).spawn();

        for tick in 1..=5u32 {
            let message = rx.recv().await.unwrap();
            assert!(message.contains(&(1000 + tick).to_string()));
            assert_eq!(start.elapsed(), INTERVAL * tick);
        }
        assert_eq!(source.calls(), 5);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_does_not_stop_loop() {
        let source = Arc::new(ScriptedSource {
            fail_on: Some(2),
            ..Default::default()
        });
        let viewers = Arc::new(ViewerRegistry::new());
        let (_id, mut rx) = viewers.register();

        let start = Instant::now();
        let handle = updater(source.clone(), viewers).spawn();

        assert!(rx.recv().await.unwrap().contains("1001"));

        let after_failure = rx.recv().await.unwrap();
        assert!(after_failure.contains("1003"));
        assert_eq!(start.elapsed(), INTERVAL * 3);
        assert_eq!(source.calls(), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_tick_restarts_loop() {
        let source = Arc::new(ScriptedSource {
            panic_on: Some(2),
            ..Default::default()
        });
        let viewers = Arc::new(ViewerRegistry::new());
        let (_id, mut rx) = viewers.register();

        let handle = updater(source.clone(), viewers).spawn();

        assert!(rx.recv().await.unwrap().contains("1001"));
        assert!(rx.recv().await.unwrap().contains("1003"));
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_continue_without_viewers() {
        let source = Arc::new(ScriptedSource::default());
        let viewers = Arc::new(ViewerRegistry::new());

        let handle = updater(source.clone(), viewers.clone()).spawn();
        tokio::time::sleep(INTERVAL * 3 + Duration::from_millis(10)).await;

        assert_eq!(source.calls(), 3);
        assert_eq!(viewers.viewer_count(), 0);

        handle.abort();
    }
}
