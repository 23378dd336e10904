//! The always-on side of the collector: owns the store, queue, identity and
//! dispatcher, and turns inbound messages into queue entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use harmwatch_buffer::{
    load_preferences, record_prompt, AnonymousIdentity, BufferError, DurableQueue, FileStore,
};
use harmwatch_core::{
    derive_post_id, AppConfig, FeedbackLabel, FeedbackRecord, NormalizedPost, QueueEntry,
};
use harmwatch_dispatch::{BatchDispatcher, CollectorClient, DispatchError};
use harmwatch_extract::{ExtractorChain, Page};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Outcome of one extraction request. Exactly one is produced per request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractReply {
    Ok { result: ExtractResult },
    Timeout,
    Error { error: String },
}

/// The extracted record and whether it reached the queue.
#[derive(Debug, Serialize)]
pub struct ExtractResult {
    pub status: Handoff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub payload: NormalizedPost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Handoff {
    Buffered,
    /// The queue rejected the record; the caller should keep `payload`.
    LocalOnly,
}

/// A user's reaction as sent by the page-side UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    #[serde(default)]
    pub post_id: Option<String>,
    pub snippet: String,
    pub label: FeedbackLabel,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

pub struct Agent {
    store: Arc<FileStore>,
    queue: Arc<DurableQueue<FileStore>>,
    identity: AnonymousIdentity<FileStore>,
    dispatcher: Arc<BatchDispatcher<FileStore>>,
    chain: Arc<ExtractorChain>,
    extract_timeout: Duration,
    prompt_lock: Mutex<()>,
}

impl Agent {
    /// Opens the store at `config.store_path` and wires the services on it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] if the collector client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, DispatchError> {
        let store = Arc::new(FileStore::new(&config.store_path));
        let queue =
            Arc::new(DurableQueue::new(Arc::clone(&store)).with_max_len(config.max_queue_len));
        let client = CollectorClient::from_config(config)?;
        let dispatcher = Arc::new(BatchDispatcher::new(
            Arc::clone(&queue),
            client,
            config.batch_size,
        ));

        Ok(Self {
            identity: AnonymousIdentity::new(Arc::clone(&store)),
            store,
            queue,
            dispatcher,
            chain: Arc::new(ExtractorChain::default()),
            extract_timeout: config.extract_timeout(),
            prompt_lock: Mutex::new(()),
        })
    }

    #[cfg(test)]
    pub fn with_chain(mut self, chain: ExtractorChain, extract_timeout: Duration) -> Self {
        self.chain = Arc::new(chain);
        self.extract_timeout = extract_timeout;
        self
    }

    pub fn dispatcher(&self) -> Arc<BatchDispatcher<FileStore>> {
        Arc::clone(&self.dispatcher)
    }

    pub async fn queued(&self) -> Result<usize, BufferError> {
        self.queue.len().await
    }

    /// Extracts a record from the page snapshot and hands it to the queue.
    ///
    /// Parsing and extraction run on the blocking pool under the configured
    /// timeout. A queue failure still returns the record, marked
    /// [`Handoff::LocalOnly`].
    pub async fn extract_and_send(&self, html: String, url: String) -> ExtractReply {
        let chain = Arc::clone(&self.chain);
        let task = tokio::task::spawn_blocking(move || {
            let page = Page::parse(&html, &url);
            chain.extract(&page, Utc::now())
        });

        let post = match tokio::time::timeout(self.extract_timeout, task).await {
            Ok(Ok(post)) => post,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "extraction task failed");
                return ExtractReply::Error {
                    error: e.to_string(),
                };
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.extract_timeout.as_secs_f64(),
                    "extraction timed out"
                );
                return ExtractReply::Timeout;
            }
        };

        tracing::debug!(
            platform = %post.platform,
            source_url = %post.source_url,
            hashtags = post.hashtags.len(),
            "extracted post"
        );

        let (status, error) = match self.queue.append(QueueEntry::Post(post.clone())).await {
            Ok(_) => (Handoff::Buffered, None),
            Err(e) => {
                tracing::warn!(error = %e, "could not buffer extracted post; returning it local-only");
                (Handoff::LocalOnly, Some(e.to_string()))
            }
        };

        ExtractReply::Ok {
            result: ExtractResult {
                status,
                error,
                payload: post,
            },
        }
    }

    /// Builds a feedback record stamped with the installation id and queues
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if the identity or the queue cannot be
    /// persisted.
    pub async fn record_feedback(&self, event: FeedbackEvent) -> Result<FeedbackRecord, BufferError> {
        let anonymous_id = self.identity.get_or_create().await?;
        let post_id = event
            .post_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| derive_post_id(&event.snippet));

        let record = FeedbackRecord::new(
            anonymous_id,
            post_id,
            &event.snippet,
            event.label,
            event.reason,
            event.url,
            Utc::now(),
        );
        self.queue.append(record.clone().into()).await?;
        tracing::info!(label = %record.label, post_id = %record.post_id, "feedback queued");
        Ok(record)
    }

    /// Whether a feedback prompt may be shown now. A `true` answer records
    /// the prompt time, so the next call observes the cooldown.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError`] if preferences cannot be read or the prompt
    /// time cannot be written.
    pub async fn prompt_check(&self, now_ms: i64) -> Result<bool, BufferError> {
        let _guard = self.prompt_lock.lock().await;
        let prefs = load_preferences(self.store.as_ref()).await?;
        if !prefs.prompt_due(now_ms) {
            return Ok(false);
        }
        record_prompt(self.store.as_ref(), now_ms).await?;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "agent_test.rs"]
pub(crate) mod tests;
