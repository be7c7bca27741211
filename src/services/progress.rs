use crate::config::ProgressConfig;
use crate::models::{CandidateFile, UploadBatch};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publishes the synthetic progress of the batch in flight.
///
/// While a request is outstanding a ticker bumps the percentage by one point
/// per tick up to the configured ceiling. Real byte counts are not observed.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<Option<UploadBatch>>,
    tick: Duration,
    ceiling: u8,
    ticker: Option<JoinHandle<()>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(&ProgressConfig::default())
    }
}

impl ProgressTracker {
    pub fn new(config: &ProgressConfig) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            tick: Duration::from_millis(config.tick_ms.max(1)),
            ceiling: config.ceiling.min(99),
            ticker: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UploadBatch>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<UploadBatch> {
        self.tx.borrow().clone()
    }

    /// Publish a fresh batch and start ticking.
    pub fn begin(&mut self, files: &[CandidateFile]) -> UploadBatch {
        self.stop_ticker();

        let batch = UploadBatch::start(files);
        self.tx.send_replace(Some(batch.clone()));

        let tx = self.tx.clone();
        let tick = self.tick;
        let ceiling = self.ceiling;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick fires immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                tx.send_if_modified(|state| match state {
                    Some(batch) if batch.percentage < ceiling => {
                        batch.percentage += 1;
                        true
                    }
                    _ => false,
                });
            }
        }));

        batch
    }

    /// Mark the batch complete. The snapshot stays visible until `clear`.
    pub fn finish(&mut self) {
        self.stop_ticker();
        self.tx.send_if_modified(|state| match state {
            Some(batch) => {
                batch.complete();
                true
            }
            None => false,
        });
    }

    pub fn clear(&mut self) {
        self.stop_ticker();
        self.tx.send_replace(None);
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
