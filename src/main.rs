//! feed-notifier binary entrypoint.
//! Loads config, starts one cron-driven poll task per feed and (optionally)
//! the status/metrics listener, then runs until Ctrl-C.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feed_notifier::api::{self, AppState};
use feed_notifier::config::load_config_default;
use feed_notifier::ingest::{scheduler, HttpFeedSource};
use feed_notifier::metrics::{ensure_metrics_described, Metrics};
use feed_notifier::notify::NtfyNotifier;
use feed_notifier::FeedService;

/// Compact logs by default, JSON when LOG_FORMAT=json.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feed_notifier=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = Arc::new(load_config_default(explicit.as_deref()).context("loading configuration")?);
    tracing::info!(
        feeds = config.feeds.len(),
        endpoint = %config.ntfy.url,
        auth = ?config.ntfy.auth,
        "configuration loaded"
    );

    let metrics_handle = match config.metrics_addr {
        Some(_) => Some(Metrics::init()?.handle),
        None => {
            ensure_metrics_described();
            None
        }
    };

    let source = Arc::new(HttpFeedSource::new(config.poll_timeout)?);
    let notifier = Arc::new(NtfyNotifier::new(&config.ntfy)?);
    let service = Arc::new(FeedService::new(config.clone(), source, notifier));

    let mut tasks = scheduler::spawn_all(service.clone());

    if let Some(addr) = config.metrics_addr {
        let state = AppState {
            service: service.clone(),
            metrics: metrics_handle,
        };
        tasks.push(tokio::spawn(async move {
            if let Err(e) = api::serve(addr, state).await {
                tracing::error!(error = ?e, "status listener stopped");
            }
        }));
    }

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("shutting down");
    for t in tasks {
        t.abort();
    }
    Ok(())
}
