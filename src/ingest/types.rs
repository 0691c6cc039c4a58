// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One post as received from the feed. Immutable once constructed; consumed
/// by exactly one cycle and not retained.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Title and body joined the way the scorer consumes them.
    pub fn combined_text(&self) -> String {
        if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }
}

/// The fixed set of feed listings pulled each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedCategory {
    MostActive,
    MostRecent,
    Trending,
}

impl FeedCategory {
    pub const ALL: [FeedCategory; 3] = [
        FeedCategory::MostActive,
        FeedCategory::MostRecent,
        FeedCategory::Trending,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedCategory::MostActive => "most-active",
            FeedCategory::MostRecent => "most-recent",
            FeedCategory::Trending => "trending",
        }
    }
}

#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, category: FeedCategory, limit: usize) -> Result<Vec<Document>>;
    fn name(&self) -> &'static str;
}
