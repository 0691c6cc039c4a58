//! # Refresh Cycle
//! The repeating fetch → process → publish loop. One cycle pulls every feed
//! category, runs each document through extraction, verification and scoring,
//! folds the survivors into the aggregator, and publishes one snapshot bundle
//! per window. A cycle that fetches nothing leaves the previous aggregates
//! untouched.

use chrono::Utc;
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::aggregate::{Aggregator, Window};
use crate::config::CategoryLimits;
use crate::extract;
use crate::ingest::types::{Document, DocumentSource};
use crate::ingest::{self, normalize_text};
use crate::publish::{SnapshotBundle, SnapshotPublisher};
use crate::sentiment::SentimentAnalyzer;
use crate::verify::SymbolVerifier;

/// Summary of one cycle, for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub documents: usize,
    pub recorded_mentions: usize,
    pub failed_categories: usize,
    pub aborted: bool,
}

/// Owns every pipeline collaborator; one instance drives the whole loop.
pub struct RefreshController {
    source: Box<dyn DocumentSource>,
    verifier: SymbolVerifier,
    analyzer: SentimentAnalyzer,
    aggregator: Arc<Aggregator>,
    publisher: SnapshotPublisher,
    limits: CategoryLimits,
}

impl RefreshController {
    pub fn new(
        source: Box<dyn DocumentSource>,
        verifier: SymbolVerifier,
        aggregator: Arc<Aggregator>,
        publisher: SnapshotPublisher,
        limits: CategoryLimits,
    ) -> Self {
        Self {
            source,
            verifier,
            analyzer: SentimentAnalyzer::new(),
            aggregator,
            publisher,
            limits,
        }
    }

    /// One full fetch-process-publish pass.
    pub async fn run_cycle(&self) -> CycleOutcome {
        counter!("cycle_runs_total").increment(1);
        let (docs, failed_categories) =
            ingest::fetch_working_set(self.source.as_ref(), &self.limits).await;

        if docs.is_empty() {
            tracing::warn!(
                failed_categories,
                "no documents fetched; keeping previous aggregates"
            );
            counter!("cycle_aborted_total").increment(1);
            return CycleOutcome {
                failed_categories,
                aborted: true,
                ..CycleOutcome::default()
            };
        }

        // Aggregates are per-cycle: reset only once a non-empty batch is in
        // hand.
        self.aggregator.reset();

        let mut recorded_mentions = 0usize;
        for doc in &docs {
            recorded_mentions += self.process_document(doc).await;
        }

        self.verifier.expire_stale(Utc::now());

        let now = Utc::now();
        let bundle = SnapshotBundle {
            generated_at: now,
            windows: Window::ALL
                .into_iter()
                .map(|w| (w.label().to_string(), self.aggregator.snapshot(w, now)))
                .collect(),
        };
        self.publisher.publish(bundle);

        counter!("documents_processed_total").increment(docs.len() as u64);
        gauge!("cycle_last_run_ts").set(now.timestamp() as f64);

        CycleOutcome {
            documents: docs.len(),
            recorded_mentions,
            failed_categories,
            aborted: false,
        }
    }

    /// Extract, verify, score and record one document. Returns the number of
    /// mentions recorded; a document that yields nothing is just skipped.
    async fn process_document(&self, doc: &Document) -> usize {
        let text = normalize_text(&doc.combined_text());
        if text.is_empty() {
            tracing::debug!("document empty after normalization; skipped");
            return 0;
        }

        let mut verified = Vec::new();
        for candidate in extract::extract(&text) {
            if self.verifier.verify(&candidate).await {
                verified.push(candidate);
            }
        }
        if verified.is_empty() {
            return 0;
        }

        // One classification for the whole document, applied to every
        // surviving symbol.
        let class = self.analyzer.classify(&text);
        for symbol in &verified {
            self.aggregator.record(symbol, class, doc.created_at);
        }
        verified.len()
    }

    /// Spawn the repeating loop: run a cycle, sleep, repeat, until the
    /// shutdown signal flips. The first cycle starts immediately.
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcome = self.run_cycle().await;
                        tracing::info!(
                            documents = outcome.documents,
                            mentions = outcome.recorded_mentions,
                            failed_categories = outcome.failed_categories,
                            aborted = outcome.aborted,
                            "refresh cycle finished"
                        );
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            tracing::info!("refresh loop stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}
