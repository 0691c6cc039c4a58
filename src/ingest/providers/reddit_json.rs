//! Reddit-style JSON listing provider. Each feed category maps to a listing
//! endpoint (`hot`, `new`, `rising`); items carry a title, an optional
//! selftext body, and a unix `created_utc` timestamp.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::types::{Document, DocumentSource, FeedCategory};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}
#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}
#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}
#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    selftext: Option<String>,
    created_utc: Option<f64>,
}

fn unix_f64_to_datetime(ts: f64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts as i64, 0).unwrap_or_default()
}

pub struct RedditListingProvider {
    mode: Mode,
}

enum Mode {
    /// A canned listing body, served for every category. Tests only.
    Fixture(String),
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

impl RedditListingProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    fn listing_path(category: FeedCategory) -> &'static str {
        match category {
            FeedCategory::MostActive => "hot",
            FeedCategory::MostRecent => "new",
            FeedCategory::Trending => "rising",
        }
    }

    fn parse_listing(s: &str, limit: usize) -> Result<Vec<Document>> {
        let t0 = std::time::Instant::now();
        let listing: Listing = serde_json::from_str(s).context("parsing feed listing json")?;

        let mut out = Vec::with_capacity(listing.data.children.len().min(limit));
        for child in listing.data.children.into_iter().take(limit) {
            let post = child.data;
            let title = crate::ingest::normalize_text(post.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let body = crate::ingest::normalize_text(post.selftext.as_deref().unwrap_or_default());

            out.push(Document {
                title,
                body,
                created_at: post.created_utc.map(unix_f64_to_datetime).unwrap_or_default(),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        counter!("feed_posts_parsed_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl DocumentSource for RedditListingProvider {
    async fn fetch(&self, category: FeedCategory, limit: usize) -> Result<Vec<Document>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_listing(s, limit),

            Mode::Http { base_url, client } => {
                let url = format!(
                    "{}/{}.json?limit={}",
                    base_url.trim_end_matches('/'),
                    Self::listing_path(category),
                    limit
                );
                let body = client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("feed listing get {url}"))?
                    .error_for_status()
                    .context("feed listing status")?
                    .text()
                    .await
                    .context("feed listing body")?;
                Self::parse_listing(&body, limit)
            }
        }
    }

    fn name(&self) -> &'static str {
        "RedditListing"
    }
}
