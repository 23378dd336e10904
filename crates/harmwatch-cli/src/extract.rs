//! `extract`: run the extractor chain over a saved page.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use harmwatch_buffer::{DurableQueue, FileStore};
use harmwatch_extract::extract_from_html;

/// Extract one record from `file`, print it as JSON, and optionally queue it.
pub(crate) async fn run_extract(
    queue: &DurableQueue<FileStore>,
    file: &Path,
    url: &str,
    enqueue: bool,
) -> anyhow::Result<()> {
    let html = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let post = extract_from_html(&html, url, Utc::now());
    tracing::debug!(file = %file.display(), platform = %post.platform, "extracted post");
    println!("{}", serde_json::to_string_pretty(&post)?);

    if enqueue {
        let dropped = queue.append(post.into()).await?;
        let queued = queue.len().await?;
        println!("queued ({queued} entries waiting)");
        if dropped > 0 {
            println!("dropped {dropped} oldest entries to stay within the queue limit");
        }
    }
    Ok(())
}
