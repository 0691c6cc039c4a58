// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod config;
pub mod cycle;
pub mod extract;
pub mod ingest;
pub mod metrics;
pub mod oracle;
pub mod publish;
pub mod sentiment;
pub mod verify;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{Aggregator, SentimentRecord, Window, WindowSnapshot};
pub use crate::api::{create_router, AppState};
pub use crate::cycle::{CycleOutcome, RefreshController};
pub use crate::publish::{SnapshotBundle, SnapshotPublisher};
pub use crate::sentiment::{SentimentAnalyzer, SentimentClass};
pub use crate::verify::{SymbolOracle, SymbolVerifier, VerifyOutcome};
