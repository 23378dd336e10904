//! The drain, send, reconcile cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use harmwatch_buffer::{DurableQueue, KeyValueStore};
use harmwatch_core::QueueEntry;

use crate::client::CollectorClient;
use crate::error::DispatchError;

/// What one [`BatchDispatcher::tick`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A previous tick was still sending; nothing was touched.
    Skipped,
    /// The queue was empty.
    Idle,
    /// `count` entries were accepted by the collector.
    Delivered { count: usize },
    /// Delivery failed and `count` entries went back to the front of the
    /// queue.
    Requeued { count: usize, error: String },
}

/// Totals from [`BatchDispatcher::flush`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub batches: usize,
    pub delivered: usize,
    /// Entries put back by a failed batch, which ends the flush.
    pub requeued: usize,
}

/// Moves queued entries to the collector one batch at a time.
///
/// At most one tick runs at once; a tick that starts while another is in
/// flight returns [`TickOutcome::Skipped`] without touching the queue.
///
/// A drained batch is owned by a guard until the collector accepts it or it
/// is back in the queue. If the tick is cancelled in between, the guard
/// requeues the batch, so delivery stays at-least-once.
pub struct BatchDispatcher<S> {
    queue: Arc<DurableQueue<S>>,
    client: CollectorClient,
    batch_size: usize,
    busy: AtomicBool,
}

impl<S: KeyValueStore> BatchDispatcher<S> {
    #[must_use]
    pub fn new(queue: Arc<DurableQueue<S>>, client: CollectorClient, batch_size: usize) -> Self {
        Self {
            queue,
            client,
            batch_size: batch_size.max(1),
            busy: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Whether a tick is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Runs one dispatch cycle.
    ///
    /// Delivery failures are not errors: the batch is requeued and reported
    /// as [`TickOutcome::Requeued`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Buffer`] if the queue cannot be drained, or
    /// if a failed batch cannot be put back.
    pub async fn tick(&self) -> Result<TickOutcome, DispatchError> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("dispatch: previous batch still in flight; skipping tick");
            return Ok(TickOutcome::Skipped);
        };

        let batch = self.queue.take_batch(self.batch_size).await?;
        if batch.is_empty() {
            return Ok(TickOutcome::Idle);
        }
        let count = batch.len();
        let mut pending = PendingBatch::new(Arc::clone(&self.queue), batch);

        match self.client.send_batch(pending.entries()).await {
            Ok(()) => {
                pending.settle();
                tracing::info!(count, "dispatch: batch delivered");
                Ok(TickOutcome::Delivered { count })
            }
            Err(e) => {
                tracing::warn!(count, error = %e, "dispatch: delivery failed; requeueing batch");
                if let Err(requeue_err) = self.queue.requeue_front(pending.entries().to_vec()).await {
                    pending.settle();
                    tracing::error!(
                        count,
                        error = %requeue_err,
                        "dispatch: could not requeue failed batch; entries lost"
                    );
                    return Err(requeue_err.into());
                }
                pending.settle();
                Ok(TickOutcome::Requeued {
                    count,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Waits up to `limit` for an in-flight tick to finish. Returns `false`
    /// if one is still running when the limit passes.
    #[must_use]
    pub async fn wait_idle(&self, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while self.is_busy() {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        true
    }

    /// Ticks until the queue is empty or a batch fails.
    ///
    /// # Errors
    ///
    /// Propagates the first [`DispatchError`] from [`BatchDispatcher::tick`].
    pub async fn flush(&self) -> Result<FlushSummary, DispatchError> {
        let mut summary = FlushSummary::default();
        loop {
            match self.tick().await? {
                TickOutcome::Delivered { count } => {
                    summary.batches += 1;
                    summary.delivered += count;
                }
                TickOutcome::Requeued { count, .. } => {
                    summary.batches += 1;
                    summary.requeued = count;
                    return Ok(summary);
                }
                TickOutcome::Idle | TickOutcome::Skipped => return Ok(summary),
            }
        }
    }
}

/// Clears the busy flag when dropped, including on panic or cancellation.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A drained batch whose delivery is not settled yet. Dropping it unsettled
/// puts the entries back at the front of the queue.
struct PendingBatch<S: KeyValueStore> {
    queue: Arc<DurableQueue<S>>,
    entries: Vec<QueueEntry>,
    settled: bool,
}

impl<S: KeyValueStore> PendingBatch<S> {
    fn new(queue: Arc<DurableQueue<S>>, entries: Vec<QueueEntry>) -> Self {
        Self {
            queue,
            entries,
            settled: false,
        }
    }

    fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    fn settle(&mut self) {
        self.settled = true;
    }
}

impl<S: KeyValueStore> Drop for PendingBatch<S> {
    fn drop(&mut self) {
        if self.settled || self.entries.is_empty() {
            return;
        }
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(count, "dispatch: tick cancelled with no runtime; entries lost");
            return;
        };
        tracing::warn!(count, "dispatch: tick cancelled mid-send; requeueing batch");
        let queue = Arc::clone(&self.queue);
        handle.spawn(async move {
            if let Err(e) = queue.requeue_front(entries).await {
                tracing::error!(
                    count,
                    error = %e,
                    "dispatch: could not requeue cancelled batch; entries lost"
                );
            }
        });
    }
}
