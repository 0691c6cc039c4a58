use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("cycle_runs_total", "Refresh cycles started.");
        describe_counter!(
            "cycle_aborted_total",
            "Cycles aborted because no documents were fetched."
        );
        describe_counter!(
            "documents_processed_total",
            "Documents run through the pipeline."
        );
        describe_counter!("feed_documents_total", "Documents returned by the feed.");
        describe_counter!("feed_fetch_errors_total", "Per-category feed fetch errors.");
        describe_counter!("feed_posts_parsed_total", "Posts parsed from listings.");
        describe_histogram!("feed_parse_ms", "Listing parse time in milliseconds.");
        describe_counter!("verify_oracle_lookups_total", "Symbol oracle lookups.");
        describe_counter!("verify_oracle_errors_total", "Symbol oracle failures.");
        describe_counter!("snapshot_publish_total", "Snapshot bundles published.");
        describe_gauge!("cycle_last_run_ts", "Unix ts of the last finished cycle.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and expose a static gauge for the
    /// configured refresh interval.
    pub fn init(refresh_interval_secs: u64) -> Self {
        let builder = PrometheusBuilder::new();

        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");

        ensure_metrics_described();
        gauge!("tracker_refresh_interval_secs").set(refresh_interval_secs as f64);

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
