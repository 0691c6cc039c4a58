// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::config::CategoryLimits;
use crate::ingest::types::{Document, DocumentSource, FeedCategory};
use metrics::counter;

/// Normalize post text: decode HTML entities, strip markup, collapse
/// whitespace, cap the length.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 4) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Pull every category once and concatenate the results.
///
/// A failing category is logged and skipped; the caller decides what an empty
/// working set means (the cycle aborts on one). Returns the documents plus
/// the number of categories that failed.
pub async fn fetch_working_set(
    source: &dyn DocumentSource,
    limits: &CategoryLimits,
) -> (Vec<Document>, usize) {
    let mut docs = Vec::new();
    let mut failed = 0usize;

    for category in FeedCategory::ALL {
        match source.fetch(category, limits.limit_for(category)).await {
            Ok(mut batch) => {
                counter!("feed_documents_total").increment(batch.len() as u64);
                docs.append(&mut batch);
            }
            Err(e) => {
                tracing::warn!(error = ?e, category = category.as_str(), source = source.name(), "category fetch failed");
                counter!("feed_fetch_errors_total").increment(1);
                failed += 1;
            }
        }
    }

    (docs, failed)
}
