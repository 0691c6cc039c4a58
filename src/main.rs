//! Ticker Sentiment Tracker binary entrypoint.
//! Boots the refresh loop and the Axum HTTP server, wiring shared state,
//! routes, and shutdown handling.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ticker_sentiment_tracker::aggregate::Aggregator;
use ticker_sentiment_tracker::api::{self, AppState};
use ticker_sentiment_tracker::config::TrackerConfig;
use ticker_sentiment_tracker::cycle::RefreshController;
use ticker_sentiment_tracker::ingest::providers::reddit_json::RedditListingProvider;
use ticker_sentiment_tracker::metrics::Metrics;
use ticker_sentiment_tracker::oracle::HttpQuoteOracle;
use ticker_sentiment_tracker::publish::SnapshotPublisher;
use ticker_sentiment_tracker::verify::SymbolVerifier;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = TrackerConfig::load_default().context("loading tracker config")?;
    tracing::info!(?cfg, "tracker starting");

    let metrics = Metrics::init(cfg.refresh_interval_secs);

    let aggregator = Arc::new(Aggregator::new());
    let publisher = SnapshotPublisher::new();

    let controller = Arc::new(RefreshController::new(
        Box::new(RedditListingProvider::from_base_url(cfg.feed_base_url.clone())),
        SymbolVerifier::new(Box::new(HttpQuoteOracle::new(cfg.oracle_base_url.clone()))),
        aggregator.clone(),
        publisher.clone(),
        cfg.limits.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = controller.spawn(
        Duration::from_secs(cfg.refresh_interval_secs),
        shutdown_rx,
    );

    let router = api::create_router(AppState {
        aggregator,
        publisher,
    })
    .merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("http server")?;

    // Stop the refresh loop between cycles and wait for it to wind down.
    let _ = shutdown_tx.send(true);
    let _ = loop_handle.await;

    Ok(())
}
