//! Batching usage logger

use super::{UsageRecord, UsageSink};
use crate::config::models::UsageConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

enum Command {
    Record(Box<UsageRecord>),
    Flush,
    Shutdown,
}

/// Non-blocking batching logger in front of a [`UsageSink`]
pub struct UsageLogger {
    tx: mpsc::Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl UsageLogger {
    /// Spawn the background flush task
    pub fn new(sink: Arc<dyn UsageSink>, config: &UsageConfig) -> Self {
        Self::with_flush_interval(sink, config, Duration::from_secs(config.flush_interval_secs))
    }

    /// Spawn with a custom flush interval. Used by tests to observe
    /// interval-driven flushes without waiting seconds.
    pub fn with_flush_interval(
        sink: Arc<dyn UsageSink>,
        config: &UsageConfig,
        flush_interval: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let batch_size = config.batch_size;
        let worker = tokio::spawn(run_worker(sink, rx, batch_size, flush_interval));

        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Enqueue a record. Never blocks; a full buffer drops the record with
    /// a warning rather than failing the originating request.
    pub fn record(&self, record: UsageRecord) {
        if let Err(e) = self.tx.try_send(Command::Record(Box::new(record))) {
            warn!("usage buffer full or closed; dropping record: {e}");
        }
    }

    /// Ask the worker to flush whatever is buffered
    pub fn request_flush(&self) {
        let _ = self.tx.try_send(Command::Flush);
    }

    /// Flush the tail and stop the worker
    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }
}

async fn run_worker(
    sink: Arc<dyn UsageSink>,
    mut rx: mpsc::Receiver<Command>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut buffer: Vec<UsageRecord> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Record(record)) => {
                    buffer.push(*record);
                    if buffer.len() >= batch_size {
                        flush(&sink, &mut buffer).await;
                    }
                }
                Some(Command::Flush) => flush(&sink, &mut buffer).await,
                Some(Command::Shutdown) | None => {
                    // Drain anything still queued before the final flush
                    while let Ok(Command::Record(record)) = rx.try_recv() {
                        buffer.push(*record);
                    }
                    flush(&sink, &mut buffer).await;
                    return;
                }
            },
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    flush(&sink, &mut buffer).await;
                }
            }
        }
    }
}

async fn flush(sink: &Arc<dyn UsageSink>, buffer: &mut Vec<UsageRecord>) {
    if buffer.is_empty() {
        return;
    }
    let batch = std::mem::take(buffer);
    let count = batch.len();
    if let Err(e) = sink.append(batch).await {
        // Logging failures must never fail requests
        warn!(records = count, "usage sink append failed: {e}");
    } else {
        debug!(records = count, "usage batch flushed");
    }
}
