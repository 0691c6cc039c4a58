//! # Mention Aggregation
//! Per-symbol counters for the current refresh cycle plus windowed read-only
//! snapshots. The record map is reset at the start of every cycle, so the
//! aggregates are a per-cycle picture, not cumulative history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::sentiment::SentimentClass;

/// Named lookback windows over `last_updated`. Views over the same records,
/// not separate storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    H12,
    D1,
    W1,
    M1,
}

impl Window {
    pub const ALL: [Window; 4] = [Window::H12, Window::D1, Window::W1, Window::M1];

    pub fn label(self) -> &'static str {
        match self {
            Window::H12 => "12H",
            Window::D1 => "1D",
            Window::W1 => "1W",
            Window::M1 => "1M",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Window::H12 => Duration::hours(12),
            Window::D1 => Duration::days(1),
            Window::W1 => Duration::days(7),
            Window::M1 => Duration::days(30),
        }
    }

    pub fn from_label(s: &str) -> Option<Window> {
        Window::ALL.into_iter().find(|w| w.label().eq_ignore_ascii_case(s))
    }
}

/// Running counters for one symbol within the current cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentRecord {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub total_mentions: u64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentionBreakdown {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// One symbol's row in a window snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolWindowEntry {
    pub mentions: MentionBreakdown,
    pub total_mentions: u64,
    pub last_updated: DateTime<Utc>,
}

/// Read-only view of the records whose `last_updated` falls inside a window.
pub type WindowSnapshot = BTreeMap<String, SymbolWindowEntry>;

/// Owned aggregate state. Writers go through `record`; readers only ever see
/// owned snapshot copies.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Mutex<HashMap<String, SentimentRecord>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classified mention into the symbol's record.
    /// `last_updated` is last-write-wins: out-of-order documents within a
    /// cycle leave it at processing order, not true recency.
    pub fn record(&self, symbol: &str, class: SentimentClass, timestamp: DateTime<Utc>) {
        let symbol = symbol.trim().to_ascii_uppercase();
        let mut records = self.records.lock().expect("aggregator mutex poisoned");
        let rec = records.entry(symbol).or_default();

        if rec.first_seen.is_none() {
            rec.first_seen = Some(timestamp);
        }
        match class {
            SentimentClass::Positive => rec.positive += 1,
            SentimentClass::Neutral => rec.neutral += 1,
            SentimentClass::Negative => rec.negative += 1,
        }
        rec.total_mentions += 1;
        rec.last_updated = Some(timestamp);
    }

    /// Pure read: symbols whose `last_updated` lies within the window's
    /// lookback from `now`.
    pub fn snapshot(&self, window: Window, now: DateTime<Utc>) -> WindowSnapshot {
        let cutoff = now - window.duration();
        let records = self.records.lock().expect("aggregator mutex poisoned");

        records
            .iter()
            .filter_map(|(symbol, rec)| {
                let last_updated = rec.last_updated?;
                if last_updated <= cutoff {
                    return None;
                }
                Some((
                    symbol.clone(),
                    SymbolWindowEntry {
                        mentions: MentionBreakdown {
                            positive: rec.positive,
                            neutral: rec.neutral,
                            negative: rec.negative,
                        },
                        total_mentions: rec.total_mentions,
                        last_updated,
                    },
                ))
            })
            .collect()
    }

    /// Drop every record; the next cycle starts from an empty map.
    pub fn reset(&self) {
        self.records.lock().expect("aggregator mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("aggregator mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned copy of the raw record map, for diagnostics and tests.
    pub fn records(&self) -> HashMap<String, SentimentRecord> {
        self.records.lock().expect("aggregator mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_always_sum_to_total() {
        let agg = Aggregator::new();
        let now = Utc::now();
        for class in [
            SentimentClass::Positive,
            SentimentClass::Positive,
            SentimentClass::Neutral,
            SentimentClass::Negative,
        ] {
            agg.record("GME", class, now);
        }
        agg.record("tsla", SentimentClass::Positive, now);

        let records = agg.records();
        for rec in records.values() {
            assert_eq!(rec.positive + rec.neutral + rec.negative, rec.total_mentions);
        }
        let gme = &records["GME"];
        assert_eq!((gme.positive, gme.neutral, gme.negative), (2, 1, 1));
        // Symbols are keyed uppercase.
        assert!(records.contains_key("TSLA"));
    }

    #[test]
    fn first_seen_sticks_last_updated_moves() {
        let agg = Aggregator::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);

        agg.record("GME", SentimentClass::Neutral, t0);
        agg.record("GME", SentimentClass::Positive, t1);

        let records = agg.records();
        let rec = &records["GME"];
        assert_eq!(rec.first_seen, Some(t0));
        assert_eq!(rec.last_updated, Some(t1));
    }

    #[test]
    fn window_filtering_by_last_updated() {
        let agg = Aggregator::new();
        let now = Utc::now();
        agg.record("GME", SentimentClass::Positive, now - Duration::days(2));

        assert!(agg.snapshot(Window::H12, now).is_empty());
        assert!(agg.snapshot(Window::D1, now).is_empty());
        assert!(agg.snapshot(Window::W1, now).contains_key("GME"));
        assert!(agg.snapshot(Window::M1, now).contains_key("GME"));
    }

    #[test]
    fn reset_empties_every_window() {
        let agg = Aggregator::new();
        let now = Utc::now();
        agg.record("GME", SentimentClass::Positive, now);
        agg.reset();

        for window in Window::ALL {
            assert!(agg.snapshot(window, now).is_empty());
        }
        assert!(agg.is_empty());
    }

    #[test]
    fn snapshot_carries_the_breakdown() {
        let agg = Aggregator::new();
        let now = Utc::now();
        agg.record("AAPL", SentimentClass::Negative, now);
        agg.record("AAPL", SentimentClass::Negative, now);

        let snap = agg.snapshot(Window::H12, now);
        let entry = &snap["AAPL"];
        assert_eq!(entry.mentions.negative, 2);
        assert_eq!(entry.total_mentions, 2);
        assert_eq!(entry.last_updated, now);
    }

    #[test]
    fn window_labels_round_trip() {
        for window in Window::ALL {
            assert_eq!(Window::from_label(window.label()), Some(window));
        }
        assert_eq!(Window::from_label("2H"), None);
    }
}
