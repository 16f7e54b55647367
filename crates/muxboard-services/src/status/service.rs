use futures::future::join_all;
use muxboard_core::config::StatusUpdateConfig;
use muxboard_core::{AssetStatus, AssetStatusRecord, TransitionOutcome};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use utoipa::ToSchema;

use super::store::{AssetStatusStore, StatusStoreError};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Configuration for status update persistence
#[derive(Clone, Debug)]
pub struct StatusUpdateServiceConfig {
    pub write_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub queue_capacity: usize,
    pub max_concurrent_retries: usize,
}

impl Default for StatusUpdateServiceConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_millis(2000),
            max_retries: 5,
            retry_base_delay: Duration::from_millis(500),
            queue_capacity: 1024,
            max_concurrent_retries: 16,
        }
    }
}

impl From<&StatusUpdateConfig> for StatusUpdateServiceConfig {
    fn from(config: &StatusUpdateConfig) -> Self {
        Self {
            write_timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_ms),
            queue_capacity: config.queue_capacity,
            ..Self::default()
        }
    }
}

/// What happened to a status update by the time `apply` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdateOutcome {
    /// Written to the store.
    Applied { previous: Option<AssetStatus> },
    /// The asset already had this status.
    Unchanged,
    /// Older than what the store holds; dropped.
    Ignored { current: AssetStatus },
    /// Event carried no recognized status; nothing to persist.
    Skipped,
    /// The write failed or timed out and was queued for retry.
    Enqueued,
    /// The write failed and the retry queue could not take it.
    Dropped,
}

impl From<TransitionOutcome> for StatusUpdateOutcome {
    fn from(outcome: TransitionOutcome) -> Self {
        match outcome {
            TransitionOutcome::Applied { previous } => StatusUpdateOutcome::Applied { previous },
            TransitionOutcome::Unchanged => StatusUpdateOutcome::Unchanged,
            TransitionOutcome::Ignored { current } => StatusUpdateOutcome::Ignored { current },
        }
    }
}

#[derive(Default)]
struct StatusUpdateMetrics {
    applied: AtomicU64,
    unchanged: AtomicU64,
    ignored: AtomicU64,
    failed: AtomicU64,
    enqueued: AtomicU64,
    retried: AtomicU64,
    dropped: AtomicU64,
}

impl StatusUpdateMetrics {
    fn record(&self, outcome: &TransitionOutcome) {
        let counter = match outcome {
            TransitionOutcome::Applied { .. } => &self.applied,
            TransitionOutcome::Unchanged => &self.unchanged,
            TransitionOutcome::Ignored { .. } => &self.ignored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time view of the status update counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusUpdateMetricsSnapshot {
    pub applied: u64,
    pub unchanged: u64,
    pub ignored: u64,
    /// First-attempt writes that failed or timed out
    pub failed: u64,
    pub enqueued: u64,
    /// Writes that succeeded on a retry
    pub retried: u64,
    /// Writes given up on (queue full or retries exhausted)
    pub dropped: u64,
    /// Retries currently waiting in the queue
    pub pending: u64,
}

#[derive(Debug)]
struct RetryItem {
    asset_id: String,
    status: AssetStatus,
    attempt: u32,
}

/// Records asset status transitions without letting storage latency or
/// failures reach the caller.
#[derive(Clone)]
pub struct StatusUpdateService {
    store: Arc<dyn AssetStatusStore>,
    config: StatusUpdateServiceConfig,
    metrics: Arc<StatusUpdateMetrics>,
    retry_tx: mpsc::Sender<RetryItem>,
    shutdown_tx: mpsc::Sender<()>,
}

impl StatusUpdateService {
    /// Create the service and spawn its retry worker. Must be called inside a
    /// Tokio runtime.
    pub fn new(store: Arc<dyn AssetStatusStore>, config: StatusUpdateServiceConfig) -> Self {
        let (retry_tx, retry_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let metrics = Arc::new(StatusUpdateMetrics::default());

        let store_clone = store.clone();
        let config_clone = config.clone();
        let metrics_clone = metrics.clone();
        let requeue_tx = retry_tx.clone();

        tokio::spawn(async move {
            Self::worker_loop(
                store_clone,
                config_clone,
                metrics_clone,
                requeue_tx,
                retry_rx,
                shutdown_rx,
            )
            .await;
        });

        Self {
            store,
            config,
            metrics,
            retry_tx,
            shutdown_tx,
        }
    }

    /// Record `status` for `asset_id`, waiting at most the configured write
    /// timeout. Failed writes are handed to the retry worker.
    #[tracing::instrument(skip_all, fields(asset_id = %asset_id, status = %status))]
    pub async fn apply(&self, asset_id: &str, status: AssetStatus) -> StatusUpdateOutcome {
        if status == AssetStatus::Unknown {
            return StatusUpdateOutcome::Skipped;
        }

        match Self::attempt(self.store.as_ref(), self.config.write_timeout, asset_id, status).await
        {
            Ok(outcome) => {
                self.metrics.record(&outcome);
                tracing::debug!(outcome = ?outcome, "Status update recorded");
                outcome.into()
            }
            Err(e) => {
                self.metrics.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "Status update failed, scheduling retry");
                self.enqueue(RetryItem {
                    asset_id: asset_id.to_string(),
                    status,
                    attempt: 1,
                })
            }
        }
    }

    /// Last recorded status for an asset, if the store answers in time.
    pub async fn current_status(&self, asset_id: &str) -> Option<AssetStatusRecord> {
        match tokio::time::timeout(self.config.write_timeout, self.store.get(asset_id)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                tracing::warn!(asset_id = %asset_id, error = %e, "Failed to read asset status");
                None
            }
            Err(_) => {
                tracing::warn!(asset_id = %asset_id, "Timed out reading asset status");
                None
            }
        }
    }

    /// Tracked status for each id, in order. Reads run concurrently, so a slow
    /// store costs one `write_timeout` per batch.
    pub async fn current_statuses(&self, asset_ids: &[&str]) -> Vec<Option<AssetStatus>> {
        join_all(asset_ids.iter().map(|id| self.current_status(id)))
            .await
            .into_iter()
            .map(|record| record.map(|r| r.status))
            .collect()
    }

    pub fn metrics(&self) -> StatusUpdateMetricsSnapshot {
        let pending = self
            .retry_tx
            .max_capacity()
            .saturating_sub(self.retry_tx.capacity()) as u64;
        StatusUpdateMetricsSnapshot {
            applied: self.metrics.applied.load(Ordering::Relaxed),
            unchanged: self.metrics.unchanged.load(Ordering::Relaxed),
            ignored: self.metrics.ignored.load(Ordering::Relaxed),
            failed: self.metrics.failed.load(Ordering::Relaxed),
            enqueued: self.metrics.enqueued.load(Ordering::Relaxed),
            retried: self.metrics.retried.load(Ordering::Relaxed),
            dropped: self.metrics.dropped.load(Ordering::Relaxed),
            pending,
        }
    }

    pub fn store(&self) -> &Arc<dyn AssetStatusStore> {
        &self.store
    }

    /// Stop the retry worker. Queued retries are abandoned.
    pub async fn shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(()).await {
            tracing::warn!(
                error = %e,
                "Failed to send shutdown signal to status update worker"
            );
        }
    }

    fn enqueue(&self, item: RetryItem) -> StatusUpdateOutcome {
        if self.config.max_retries == 0 {
            self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::error!(asset_id = %item.asset_id, "Status update dropped, retries disabled");
            return StatusUpdateOutcome::Dropped;
        }

        match self.retry_tx.try_send(item) {
            Ok(()) => {
                self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);
                StatusUpdateOutcome::Enqueued
            }
            Err(e) => {
                self.metrics.dropped.fetch_add(1, Ordering::Relaxed);
                let item = e.into_inner();
                tracing::error!(
                    asset_id = %item.asset_id,
                    status = %item.status,
                    "Status update dropped, retry queue unavailable"
                );
                StatusUpdateOutcome::Dropped
            }
        }
    }

    async fn attempt(
        store: &dyn AssetStatusStore,
        write_timeout: Duration,
        asset_id: &str,
        status: AssetStatus,
    ) -> Result<TransitionOutcome, StatusStoreError> {
        match tokio::time::timeout(write_timeout, store.record_transition(asset_id, status)).await
        {
            Ok(result) => result,
            Err(_) => Err(StatusStoreError::Unavailable(format!(
                "write timed out after {}ms",
                write_timeout.as_millis()
            ))),
        }
    }

    fn retry_delay(base: Duration, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        base.saturating_mul(factor).min(MAX_RETRY_DELAY)
    }

    async fn worker_loop(
        store: Arc<dyn AssetStatusStore>,
        config: StatusUpdateServiceConfig,
        metrics: Arc<StatusUpdateMetrics>,
        requeue_tx: mpsc::Sender<RetryItem>,
        mut retry_rx: mpsc::Receiver<RetryItem>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_retries.max(1)));

        tracing::info!(
            max_retries = config.max_retries,
            queue_capacity = config.queue_capacity,
            "Status update retry worker started"
        );

        loop {
            tokio::select! {
                item = retry_rx.recv() => {
                    let Some(item) = item else { break };
                    let permit = match semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };

                    let store = store.clone();
                    let config = config.clone();
                    let metrics = metrics.clone();
                    let requeue_tx = requeue_tx.clone();

                    tokio::spawn(async move {
                        tokio::time::sleep(Self::retry_delay(config.retry_base_delay, item.attempt)).await;
                        Self::process_retry(store.as_ref(), &config, &metrics, &requeue_tx, item).await;
                        drop(permit);
                    });
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Status update retry worker shutting down");
                    break;
                }
            }
        }
    }

    async fn process_retry(
        store: &dyn AssetStatusStore,
        config: &StatusUpdateServiceConfig,
        metrics: &StatusUpdateMetrics,
        requeue_tx: &mpsc::Sender<RetryItem>,
        item: RetryItem,
    ) {
        match Self::attempt(store, config.write_timeout, &item.asset_id, item.status).await {
            Ok(outcome) => {
                metrics.record(&outcome);
                metrics.retried.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    asset_id = %item.asset_id,
                    status = %item.status,
                    attempt = item.attempt,
                    outcome = ?outcome,
                    "Status update succeeded on retry"
                );
            }
            Err(e) if item.attempt >= config.max_retries => {
                metrics.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    asset_id = %item.asset_id,
                    status = %item.status,
                    attempts = item.attempt,
                    error = %e,
                    "Status update abandoned after retries"
                );
            }
            Err(e) => {
                tracing::warn!(
                    asset_id = %item.asset_id,
                    attempt = item.attempt,
                    error = %e,
                    "Status update retry failed"
                );
                let next = RetryItem {
                    attempt: item.attempt + 1,
                    ..item
                };
                if let Err(e) = requeue_tx.try_send(next) {
                    metrics.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        asset_id = %e.into_inner().asset_id,
                        "Status update dropped, retry queue unavailable"
                    );
                }
            }
        }
    }
}
