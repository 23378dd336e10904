//! The persisted outbound queue.

use std::sync::Arc;

use harmwatch_core::QueueEntry;
use serde_json::Value;

use crate::error::BufferError;
use crate::store::KeyValueStore;
use crate::BUFFER_KEY;

/// An ordered, persisted sequence of [`QueueEntry`] values.
///
/// Every mutation is one [`KeyValueStore::update`] cycle: the full sequence
/// is read, changed and written back under the store's exclusive lock, so an
/// `append` can never land between a drain's read and its write, even when
/// it comes from another process sharing the store file.
///
/// Stored items that are not recognised records are kept in place as
/// [`QueueEntry::Opaque`] and delivered as they are.
pub struct DurableQueue<S> {
    store: Arc<S>,
    key: String,
    max_len: Option<usize>,
}

impl<S: KeyValueStore> DurableQueue<S> {
    /// Opens the queue stored under [`BUFFER_KEY`] with no length bound.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            key: BUFFER_KEY.to_string(),
            max_len: None,
        }
    }

    /// Caps the queue at `max_len` entries; appends beyond it discard the
    /// oldest entries. `None` leaves the queue unbounded.
    #[must_use]
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len.filter(|n| *n > 0);
        self
    }

    #[must_use]
    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    /// Persists `entry` at the back of the queue.
    ///
    /// Returns how many of the oldest entries were discarded to respect the
    /// length bound (always `0` when unbounded).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read or written.
    pub async fn append(&self, entry: QueueEntry) -> Result<usize, BufferError> {
        let key = self.key.clone();
        let max_len = self.max_len;
        let dropped = self
            .store
            .update(&self.key, move |raw| {
                let mut entries = decode(&key, raw)?;
                entries.push(entry);
                let dropped = match max_len {
                    Some(max) if entries.len() > max => {
                        let excess = entries.len() - max;
                        entries.drain(..excess);
                        excess
                    }
                    _ => 0,
                };
                Ok((Some(encode(&entries)?), dropped))
            })
            .await?;

        if dropped > 0 {
            tracing::warn!(dropped, max_len = ?self.max_len, "queue full; dropped oldest entries");
        }
        Ok(dropped)
    }

    /// Removes and returns up to `max_count` entries from the front.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read or written. On a
    /// write failure the entries stay queued.
    pub async fn take_batch(&self, max_count: usize) -> Result<Vec<QueueEntry>, BufferError> {
        let key = self.key.clone();
        self.store
            .update(&self.key, move |raw| {
                let mut entries = decode(&key, raw)?;
                if entries.is_empty() || max_count == 0 {
                    return Ok((None, Vec::new()));
                }
                let take = max_count.min(entries.len());
                let batch: Vec<QueueEntry> = entries.drain(..take).collect();
                Ok((Some(encode(&entries)?), batch))
            })
            .await
    }

    /// Puts previously taken entries back at the front, ahead of anything
    /// appended since, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read or written.
    pub async fn requeue_front(&self, batch: Vec<QueueEntry>) -> Result<(), BufferError> {
        if batch.is_empty() {
            return Ok(());
        }
        let key = self.key.clone();
        self.store
            .update(&self.key, move |raw| {
                let current = decode(&key, raw)?;
                let mut merged = batch;
                merged.extend(current);
                Ok((Some(encode(&merged)?), ()))
            })
            .await
    }

    /// Number of queued entries.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read.
    pub async fn len(&self) -> Result<usize, BufferError> {
        Ok(self.load().await?.len())
    }

    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read.
    pub async fn is_empty(&self) -> Result<bool, BufferError> {
        Ok(self.len().await? == 0)
    }

    /// Copies up to `limit` entries from the front without removing them.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the store cannot be read.
    pub async fn snapshot(&self, limit: usize) -> Result<Vec<QueueEntry>, BufferError> {
        let mut entries = self.load().await?;
        entries.truncate(limit);
        Ok(entries)
    }

    async fn load(&self) -> Result<Vec<QueueEntry>, BufferError> {
        let raw = self.store.get(&self.key).await?;
        decode(&self.key, raw)
    }
}

fn decode(key: &str, raw: Option<Value>) -> Result<Vec<QueueEntry>, BufferError> {
    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.into_iter().map(QueueEntry::from_value).collect()),
        Some(other) => Err(BufferError::CorruptValue {
            key: key.to_string(),
            reason: format!("expected an array, found {}", json_kind(&other)),
        }),
    }
}

fn encode(entries: &[QueueEntry]) -> Result<Value, BufferError> {
    Ok(serde_json::to_value(entries)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
