//! # Symbol Verification
//! Decides whether an extracted candidate is a real, tradable instrument.
//! Confirmed and rejected symbols are cached in two bounded sets that are
//! cleared wholesale once an hour, so delistings and new listings surface
//! without restarting the process.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::extract;

/// How long cache entries live before the next cycle wipes both sets.
const CACHE_TTL_SECS: i64 = 3600;

/// External instrument lookup. Implementations report whether the symbol
/// shows recent trading activity; any error is treated as "not found" by the
/// verifier.
#[async_trait::async_trait]
pub trait SymbolOracle: Send + Sync {
    async fn lookup(&self, symbol: &str) -> Result<bool>;
    fn name(&self) -> &'static str;
}

/// Outcome of a single verification, before collapsing to the boolean
/// contract. Kept explicit so tests can see oracle failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    NotVerified,
    OracleError,
}

impl VerifyOutcome {
    pub fn is_verified(self) -> bool {
        matches!(self, VerifyOutcome::Verified)
    }
}

#[derive(Debug)]
struct Caches {
    confirmed: HashSet<String>,
    rejected: HashSet<String>,
    last_cleared: DateTime<Utc>,
}

pub struct SymbolVerifier {
    oracle: Box<dyn SymbolOracle>,
    caches: Mutex<Caches>,
}

impl SymbolVerifier {
    pub fn new(oracle: Box<dyn SymbolOracle>) -> Self {
        Self {
            oracle,
            caches: Mutex::new(Caches {
                confirmed: HashSet::new(),
                rejected: HashSet::new(),
                last_cleared: Utc::now(),
            }),
        }
    }

    /// Boolean contract used by the pipeline: oracle errors count as
    /// "not verified".
    pub async fn verify(&self, candidate: &str) -> bool {
        self.verify_outcome(candidate).await.is_verified()
    }

    /// Full verification: caches first, then structure, then the oracle.
    pub async fn verify_outcome(&self, candidate: &str) -> VerifyOutcome {
        let symbol = candidate.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return VerifyOutcome::NotVerified;
        }

        {
            let caches = self.caches.lock().expect("verifier cache mutex poisoned");
            if caches.confirmed.contains(&symbol) {
                return VerifyOutcome::Verified;
            }
            if caches.rejected.contains(&symbol) {
                return VerifyOutcome::NotVerified;
            }
        }
        if extract::is_excluded(&symbol) {
            return VerifyOutcome::NotVerified;
        }

        // Structural check; no cache write, the oracle is never consulted
        // for these.
        let stripped: String = symbol.chars().filter(|c| *c != '.').collect();
        if stripped.len() > 5 || !stripped.chars().all(|c| c.is_ascii_alphabetic()) {
            return VerifyOutcome::NotVerified;
        }

        counter!("verify_oracle_lookups_total").increment(1);
        match self.oracle.lookup(&symbol).await {
            Ok(true) => {
                self.remember(&symbol, true);
                VerifyOutcome::Verified
            }
            Ok(false) => {
                self.remember(&symbol, false);
                VerifyOutcome::NotVerified
            }
            Err(e) => {
                tracing::warn!(error = ?e, symbol = %symbol, oracle = self.oracle.name(), "oracle lookup failed");
                counter!("verify_oracle_errors_total").increment(1);
                self.remember(&symbol, false);
                VerifyOutcome::OracleError
            }
        }
    }

    fn remember(&self, symbol: &str, confirmed: bool) {
        let mut caches = self.caches.lock().expect("verifier cache mutex poisoned");
        if confirmed {
            caches.rejected.remove(symbol);
            caches.confirmed.insert(symbol.to_string());
        } else {
            caches.confirmed.remove(symbol);
            caches.rejected.insert(symbol.to_string());
        }
    }

    /// Clear both caches once the TTL has elapsed. Called once per refresh
    /// cycle rather than on its own timer.
    pub fn expire_stale(&self, now: DateTime<Utc>) {
        let mut caches = self.caches.lock().expect("verifier cache mutex poisoned");
        if now - caches.last_cleared > Duration::seconds(CACHE_TTL_SECS) {
            let (c, r) = (caches.confirmed.len(), caches.rejected.len());
            caches.confirmed.clear();
            caches.rejected.clear();
            caches.last_cleared = now;
            tracing::info!(confirmed = c, rejected = r, "verification caches cleared");
        }
    }

    /// (confirmed, rejected) cache sizes, for diagnostics and tests.
    pub fn cache_sizes(&self) -> (usize, usize) {
        let caches = self.caches.lock().expect("verifier cache mutex poisoned");
        (caches.confirmed.len(), caches.rejected.len())
    }

    #[cfg(test)]
    fn cache_overlap(&self) -> usize {
        let caches = self.caches.lock().expect("verifier cache mutex poisoned");
        caches.confirmed.intersection(&caches.rejected).count()
    }
}
