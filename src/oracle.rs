//! HTTP-backed symbol oracle. Asks a chart endpoint for recent daily bars;
//! a symbol with a non-empty timestamp series counts as tradable. The base
//! URL is configurable so tests can point the oracle at a local stub.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::verify::SymbolOracle;

pub const DEFAULT_ORACLE_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}
#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}
#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
}

pub struct HttpQuoteOracle {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpQuoteOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[async_trait]
impl SymbolOracle for HttpQuoteOracle {
    async fn lookup(&self, symbol: &str) -> Result<bool> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=5d&interval=1d",
            self.base_url.trim_end_matches('/'),
            symbol
        );

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("quote lookup get {url}"))?;

        // A 404 means the endpoint answered: no such instrument.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let resp = resp.error_for_status().context("quote lookup status")?;
        let chart: ChartResponse = resp.json().await.context("quote lookup json")?;

        let has_activity = chart
            .chart
            .result
            .unwrap_or_default()
            .iter()
            .any(|r| !r.timestamp.is_empty());
        Ok(has_activity)
    }

    fn name(&self) -> &'static str {
        "HttpQuoteOracle"
    }
}
