mod extract;
mod queue;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use harmwatch_buffer::{DurableQueue, FileStore};
use harmwatch_core::FeedbackLabel;
use tracing_subscriber::EnvFilter;

use crate::queue::QueueCommands;

#[derive(Debug, Parser)]
#[command(name = "harmwatch-cli")]
#[command(about = "Inspect and drive the harmwatch collector")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a post from a saved HTML page
    Extract {
        /// HTML file to read
        #[arg(long)]
        file: PathBuf,
        /// URL the page was captured from
        #[arg(long)]
        url: String,
        /// Append the record to the local queue
        #[arg(long)]
        enqueue: bool,
    },
    /// Inspect the local queue
    Queue {
        #[command(subcommand)]
        command: QueueCommands,
    },
    /// Deliver queued entries to the collector until empty or a batch fails
    Flush,
    /// Queue a feedback record for a post
    Feedback {
        /// Post id; derived from the snippet when omitted
        #[arg(long)]
        post_id: Option<String>,
        /// Text of the post the feedback is about
        #[arg(long)]
        snippet: String,
        /// One of agree, disagree, spam, hate, other
        #[arg(long)]
        label: FeedbackLabel,
        /// Free-text reason, kept only with `--label other`
        #[arg(long)]
        reason: Option<String>,
        /// Page the post was seen on
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("harmwatch-cli ready; see --help");
        return Ok(());
    };

    let config = harmwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(FileStore::new(&config.store_path));
    let buffer = DurableQueue::new(Arc::clone(&store)).with_max_len(config.max_queue_len);

    match command {
        Commands::Extract { file, url, enqueue } => {
            extract::run_extract(&buffer, &file, &url, enqueue).await?;
        }
        Commands::Queue { command } => queue::run_queue_command(&buffer, command).await?,
        Commands::Flush => queue::run_flush(buffer, &config).await?,
        Commands::Feedback {
            post_id,
            snippet,
            label,
            reason,
            url,
        } => {
            queue::run_feedback(store, &buffer, post_id, &snippet, label, reason, url).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
