//! Queue inspection, manual delivery, and feedback entry.

use std::sync::Arc;

use chrono::Utc;
use clap::Subcommand;
use harmwatch_buffer::{AnonymousIdentity, DurableQueue, FileStore};
use harmwatch_core::{derive_post_id, AppConfig, FeedbackLabel, FeedbackRecord};
use harmwatch_dispatch::{BatchDispatcher, CollectorClient};

/// Sub-commands available under `queue`.
#[derive(Debug, Subcommand)]
pub enum QueueCommands {
    /// Show how many entries are waiting
    Status,
    /// Print entries from the front of the queue without removing them
    Peek {
        /// Maximum number of entries to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub(crate) async fn run_queue_command(
    queue: &DurableQueue<FileStore>,
    command: QueueCommands,
) -> anyhow::Result<()> {
    match command {
        QueueCommands::Status => {
            let entries = queue.snapshot(usize::MAX).await?;
            let count = |kind: &str| entries.iter().filter(|e| e.kind() == kind).count();
            println!(
                "{} queued ({} posts, {} feedback, {} unrecognised)",
                entries.len(),
                count("post"),
                count("feedback"),
                count("opaque"),
            );
            if let Some(max) = queue.max_len() {
                println!("limit: {max} (oldest dropped beyond this)");
            }
        }
        QueueCommands::Peek { limit } => {
            for entry in queue.snapshot(limit).await? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
    }
    Ok(())
}

/// Deliver everything queued, batch by batch, stopping at the first failure.
pub(crate) async fn run_flush(
    queue: DurableQueue<FileStore>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let client = CollectorClient::from_config(config)?;
    let dispatcher = BatchDispatcher::new(Arc::new(queue), client, config.batch_size);

    tracing::info!(collector = %config.collector_url, "flushing queue");
    let summary = dispatcher.flush().await?;
    println!(
        "delivered {} entries in {} batches",
        summary.delivered, summary.batches
    );
    if summary.requeued > 0 {
        println!(
            "collector rejected the last batch; {} entries kept for retry",
            summary.requeued
        );
    }
    Ok(())
}

pub(crate) async fn run_feedback(
    store: Arc<FileStore>,
    queue: &DurableQueue<FileStore>,
    post_id: Option<String>,
    snippet: &str,
    label: FeedbackLabel,
    reason: Option<String>,
    url: Option<String>,
) -> anyhow::Result<()> {
    let anonymous_id = AnonymousIdentity::new(store).get_or_create().await?;
    let post_id = post_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| derive_post_id(snippet));

    let record = FeedbackRecord::new(
        anonymous_id,
        post_id,
        snippet,
        label,
        reason,
        url,
        Utc::now(),
    );
    println!("{}", serde_json::to_string_pretty(&record)?);
    queue.append(record.into()).await?;
    Ok(())
}
