mod agent;
mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::agent::Agent;
use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(harmwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let agent = Arc::new(Agent::from_config(&config)?);
    match agent.queued().await {
        Ok(queued) => tracing::info!(
            queued,
            store = %config.store_path.display(),
            collector = %config.collector_url,
            env = %config.env,
            "harmwatch agent starting"
        ),
        Err(e) => tracing::warn!(error = %e, "could not read queue at startup"),
    }

    let mut scheduler =
        scheduler::build_scheduler(agent.dispatcher(), config.dispatch_interval()).await?;

    let app = build_app(AppState {
        agent: Arc::clone(&agent),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await?;
    // A tick still sending would be cut off when the runtime drops.
    let drain_limit = Duration::from_secs(config.request_timeout_secs + 5);
    if !agent.dispatcher().wait_idle(drain_limit).await {
        tracing::warn!(
            limit_secs = drain_limit.as_secs(),
            "dispatch tick still in flight at exit"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
