// tests/cycle_behavior.rs
// Failure handling and lifecycle of the refresh loop.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use ticker_sentiment_tracker::aggregate::Aggregator;
use ticker_sentiment_tracker::config::CategoryLimits;
use ticker_sentiment_tracker::cycle::RefreshController;
use ticker_sentiment_tracker::ingest::types::{Document, DocumentSource, FeedCategory};
use ticker_sentiment_tracker::publish::SnapshotPublisher;
use ticker_sentiment_tracker::sentiment::SentimentClass;
use ticker_sentiment_tracker::verify::{SymbolOracle, SymbolVerifier};

struct YesOracle;

#[async_trait]
impl SymbolOracle for YesOracle {
    async fn lookup(&self, _symbol: &str) -> Result<bool> {
        Ok(true)
    }
    fn name(&self) -> &'static str {
        "YesOracle"
    }
}

/// Source where individual categories can be made to fail.
struct FlakySource {
    failing: Vec<FeedCategory>,
    empty: bool,
}

#[async_trait]
impl DocumentSource for FlakySource {
    async fn fetch(&self, category: FeedCategory, _limit: usize) -> Result<Vec<Document>> {
        if self.failing.contains(&category) {
            return Err(anyhow!("category {} unavailable", category.as_str()));
        }
        if self.empty {
            return Ok(vec![]);
        }
        Ok(vec![Document {
            title: format!("TSLA chatter from {}", category.as_str()),
            body: String::new(),
            created_at: Utc::now(),
        }])
    }
    fn name(&self) -> &'static str {
        "FlakySource"
    }
}

fn controller_with(
    source: FlakySource,
) -> (RefreshController, Arc<Aggregator>, SnapshotPublisher) {
    let aggregator = Arc::new(Aggregator::new());
    let publisher = SnapshotPublisher::new();
    let controller = RefreshController::new(
        Box::new(source),
        SymbolVerifier::new(Box::new(YesOracle)),
        aggregator.clone(),
        publisher.clone(),
        CategoryLimits::default(),
    );
    (controller, aggregator, publisher)
}

#[tokio::test]
async fn one_failing_category_does_not_abort_the_cycle() {
    let (controller, aggregator, _) = controller_with(FlakySource {
        failing: vec![FeedCategory::MostActive],
        empty: false,
    });

    let outcome = controller.run_cycle().await;
    assert!(!outcome.aborted);
    assert_eq!(outcome.failed_categories, 1);
    assert_eq!(outcome.documents, 2); // the two surviving categories
    assert_eq!(aggregator.records()["TSLA"].total_mentions, 2);
}

#[tokio::test]
async fn total_fetch_failure_preserves_previous_aggregates() {
    let (controller, aggregator, publisher) = controller_with(FlakySource {
        failing: FeedCategory::ALL.to_vec(),
        empty: false,
    });

    // Data from a previous, successful cycle.
    aggregator.record("GME", SentimentClass::Positive, Utc::now());

    let outcome = controller.run_cycle().await;
    assert!(outcome.aborted);
    assert_eq!(outcome.failed_categories, 3);

    // No reset, no publish.
    assert_eq!(aggregator.records()["GME"].total_mentions, 1);
    assert!(publisher.last_known().is_none());
}

#[tokio::test]
async fn empty_fetch_counts_as_aborted() {
    let (controller, aggregator, publisher) = controller_with(FlakySource {
        failing: vec![],
        empty: true,
    });

    aggregator.record("GME", SentimentClass::Neutral, Utc::now());

    let outcome = controller.run_cycle().await;
    assert!(outcome.aborted);
    assert_eq!(outcome.failed_categories, 0);
    assert!(!aggregator.records().is_empty());
    assert!(publisher.last_known().is_none());
}

#[tokio::test]
async fn successful_cycle_resets_previous_aggregates() {
    let (controller, aggregator, _) = controller_with(FlakySource {
        failing: vec![],
        empty: false,
    });

    aggregator.record("STALE", SentimentClass::Positive, Utc::now());

    controller.run_cycle().await;

    let records = aggregator.records();
    assert!(!records.contains_key("STALE"));
    assert!(records.contains_key("TSLA"));
}

#[tokio::test]
async fn shutdown_signal_stops_the_loop_between_cycles() {
    let (controller, _, publisher) = controller_with(FlakySource {
        failing: vec![],
        empty: false,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = Arc::new(controller).spawn(Duration::from_secs(3600), shutdown_rx);

    // The first cycle fires immediately; wait for its publish.
    let mut rx = publisher.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while rx.borrow_and_update().is_none() {
            rx.changed().await.expect("publisher alive");
        }
    })
    .await
    .expect("first cycle publishes");

    shutdown_tx.send(true).expect("loop still listening");
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop stops promptly")
        .expect("loop task joins cleanly");
}
