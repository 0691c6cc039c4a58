//! # Snapshot Publishing
//! One combined message per cycle, fanned out over a `watch` channel. The
//! channel always holds the latest bundle, so a subscriber that joins late
//! sees the most recent snapshot immediately instead of waiting for the next
//! cycle.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::aggregate::WindowSnapshot;

/// The per-cycle message: every configured window's snapshot, keyed by the
/// window label, plus the generation instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotBundle {
    pub generated_at: DateTime<Utc>,
    pub windows: BTreeMap<String, WindowSnapshot>,
}

/// Shared handle around the latest published bundle.
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: Arc<watch::Sender<Option<Arc<SnapshotBundle>>>>,
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the retained bundle and wake every subscriber. Fire-and-forget:
    /// a send with no subscribers just updates the retained value.
    pub fn publish(&self, bundle: SnapshotBundle) {
        counter!("snapshot_publish_total").increment(1);
        self.tx.send_replace(Some(Arc::new(bundle)));
    }

    /// Subscribe to bundle updates. The receiver's initial value is the last
    /// published bundle, if any.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SnapshotBundle>>> {
        self.tx.subscribe()
    }

    /// The most recent bundle without subscribing.
    pub fn last_known(&self) -> Option<Arc<SnapshotBundle>> {
        self.tx.borrow().clone()
    }
}
