//! # Symbol Extraction
//! Scans free text for ticker-shaped tokens: `$`-prefixed candidates are taken
//! as-is, bare all-caps words are kept only when they survive the exclusion
//! list. Extraction is case-sensitive on purpose: a candidate is literally an
//! uppercase token of at most five letters, with an optional `.X` class
//! suffix (`BRK.B`).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// `$GME`, `$BRK.B`: the marker makes these high-confidence.
static RE_MARKED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Z]{1,5}(?:\.[A-Z])?)\b").expect("valid marked-ticker regex"));

/// `GME`, `BRK.B` as standalone words, no marker.
static RE_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z]{1,5}(?:\.[A-Z])?)\b").expect("valid bare-ticker regex"));

/// Words that collide with the ticker pattern: short English words, forum
/// jargon, finance and tech acronyms. Heuristic and deliberately incomplete.
static EXCLUDED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // common English words
        "A", "ALL", "AM", "AN", "AND", "ANY", "ARE", "AS", "AT", "BE", "BIG", "BUT", "BUY", "CAN",
        "DAY", "DID", "DO", "DOWN", "FOR", "FROM", "GET", "GO", "GOT", "HAS", "HAVE", "HE", "HER",
        "HIS", "HOLD", "HOW", "I", "IF", "IN", "IS", "IT", "ITS", "JUST", "KNOW", "LOT", "MAKE",
        "ME", "MOON", "MORE", "MY", "NEW", "NO", "NOT", "NOW", "OF", "ON", "ONE", "OR", "OUT",
        "SELL", "SHE", "SO", "THE", "THEY", "THIS", "TO", "UP", "WAS", "WE", "WHAT", "WHEN",
        "WHO", "WHY", "WILL", "WITH", "YES", "YOU",
        // forum jargon
        "AF", "BTW", "DD", "EDIT", "ELI5", "FOMO", "FYI", "HODL", "IMHO", "IMO", "IRL", "LMAO",
        "LOL", "NGL", "OG", "OMG", "OP", "PSA", "SMH", "TBH", "TIL", "TLDR", "WSB", "WTF", "YOLO",
        // finance acronyms
        "ATH", "ATM", "CEO", "CFO", "CPI", "EOD", "EPS", "ETF", "FD", "FDS", "FOMC", "GDP", "IPO",
        "IRA", "IV", "LLC", "MACD", "NYSE", "OTC", "PE", "PM", "PT", "ROI", "RSI", "SEC", "SPAC",
        "USD", "YOY", "YTD",
        // tech acronyms
        "AI", "API", "APP", "CPU", "EU", "GPU", "HTML", "HTTP", "JSON", "PC", "RAM", "SQL", "TA",
        "TV", "UI", "UK", "URL", "US", "USA", "USB",
    ]
    .into_iter()
    .collect()
});

/// True when `word` (already uppercase) sits on the static exclusion list.
pub fn is_excluded(word: &str) -> bool {
    EXCLUDED.contains(word)
}

/// Extract the set of ticker candidates from `text`.
///
/// Marked candidates are always kept; bare candidates only when they are not
/// already marked elsewhere in the text and not excluded. Order is
/// meaningless downstream, hence the set.
pub fn extract(text: &str) -> HashSet<String> {
    let mut marked: HashSet<String> = HashSet::new();
    for cap in RE_MARKED.captures_iter(text) {
        marked.insert(cap[1].to_string());
    }

    let mut out = marked.clone();
    for cap in RE_BARE.captures_iter(text) {
        let word = &cap[1];
        if marked.contains(word) || is_excluded(word) {
            continue;
        }
        out.insert(word.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn marked_candidate_wins() {
        assert_eq!(extract("Buy $GME now"), set(&["GME"]));
    }

    #[test]
    fn bare_candidates_survive_exclusion() {
        assert_eq!(
            extract("I think AAPL and TSLA will moon"),
            set(&["AAPL", "TSLA"])
        );
    }

    #[test]
    fn excluded_words_yield_nothing() {
        assert_eq!(extract("A TO DO"), HashSet::new());
    }

    #[test]
    fn lowercase_never_matches() {
        assert_eq!(extract("buy gme to the moon"), HashSet::new());
        assert_eq!(extract(""), HashSet::new());
    }

    #[test]
    fn six_letters_is_not_a_ticker() {
        assert_eq!(extract("STONKS going wild"), HashSet::new());
    }

    #[test]
    fn class_suffix_is_kept() {
        assert_eq!(extract("$BRK.B beats earnings"), set(&["BRK.B"]));
        assert_eq!(extract("holding BRK.B long term"), set(&["BRK.B"]));
    }

    #[test]
    fn marked_skips_the_exclusion_list() {
        // The marker is an explicit claim; the verifier sorts it out later.
        assert_eq!(extract("$YOLO is a real fund apparently"), set(&["YOLO"]));
    }

    #[test]
    fn marked_and_bare_mentions_collapse() {
        assert_eq!(extract("$GME GME gme"), set(&["GME"]));
    }
}
