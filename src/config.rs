// src/config.rs
//! Runtime configuration. Loaded from TOML with per-field defaults:
//! 1) $TRACKER_CONFIG_PATH
//! 2) config/tracker.toml
//! 3) built-in defaults

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedCategory;

const ENV_PATH: &str = "TRACKER_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/tracker.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryLimits {
    pub most_active: usize,
    pub most_recent: usize,
    pub trending: usize,
}

impl Default for CategoryLimits {
    fn default() -> Self {
        Self {
            most_active: 50,
            most_recent: 50,
            trending: 25,
        }
    }
}

impl CategoryLimits {
    pub fn limit_for(&self, category: FeedCategory) -> usize {
        match category {
            FeedCategory::MostActive => self.most_active,
            FeedCategory::MostRecent => self.most_recent,
            FeedCategory::Trending => self.trending,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Sleep between refresh cycles, in seconds.
    pub refresh_interval_secs: u64,
    pub bind_addr: String,
    pub feed_base_url: String,
    pub oracle_base_url: String,
    pub limits: CategoryLimits,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 300,
            bind_addr: "0.0.0.0:8000".to_string(),
            feed_base_url: "https://www.reddit.com/r/wallstreetbets".to_string(),
            oracle_base_url: crate::oracle::DEFAULT_ORACLE_BASE_URL.to_string(),
            limits: CategoryLimits::default(),
        }
    }
}

impl TrackerConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Env var wins, then the default path, then plain defaults.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        Ok(Self::default())
    }
}
