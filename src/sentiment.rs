use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Contextual cue words that shift the general-purpose polarity toward the
/// trading reading of a post. Matched case-insensitively, whole-word.
const BULLISH_CUES: &[&str] = &[
    "buy", "long", "calls", "moon", "rocket", "bullish", "pump", "growth",
];
const BEARISH_CUES: &[&str] = &[
    "sell", "short", "puts", "bearish", "dump", "crash", "drop",
];

/// Per-cue nudge applied on top of the base compound score.
const CUE_STEP: f64 = 0.1;
/// Classification thresholds on the adjusted compound score.
const POSITIVE_MIN: f64 = 0.2;
const NEGATIVE_MAX: f64 = -0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Raw lexicon score over pre-tokenized text.
    /// Negation: a negator within the 3 preceding tokens inverts the sign of
    /// a word's lexicon score.
    fn score_tokens(&self, tokens: &[String]) -> i32 {
        let mut score: i32 = 0;
        for i in 0..tokens.len() {
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let base = self.word_score(tokens[i].as_str());
            if base != 0 {
                score += if negated { -base } else { base };
            }
        }
        score
    }

    /// Base compound polarity in [-1, 1]: the raw lexicon sum squashed with
    /// `x / sqrt(x^2 + 15)`.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let raw = self.score_tokens(&tokens) as f64;
        raw / (raw * raw + 15.0).sqrt()
    }

    /// Compound score after the bullish/bearish cue adjustment, clamped to
    /// [-1, 1].
    pub fn adjusted_score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let raw = self.score_tokens(&tokens) as f64;
        let base = raw / (raw * raw + 15.0).sqrt();

        let bulls = count_cues(&tokens, BULLISH_CUES);
        let bears = count_cues(&tokens, BEARISH_CUES);

        if bulls > bears {
            (base + CUE_STEP * (bulls - bears) as f64).min(1.0)
        } else if bears > bulls {
            (base - CUE_STEP * (bears - bulls) as f64).max(-1.0)
        } else {
            base
        }
    }

    /// Bucket the adjusted score into one of the three classes.
    pub fn classify(&self, text: &str) -> SentimentClass {
        let adjusted = self.adjusted_score(text);
        if adjusted >= POSITIVE_MIN {
            SentimentClass::Positive
        } else if adjusted <= NEGATIVE_MAX {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn count_cues(tokens: &[String], cues: &[&str]) -> usize {
    tokens.iter().filter(|t| cues.contains(&t.as_str())).count()
}

/// Single-token negators; "no longer" is already covered by "no" alone.
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn't" | "wasn't" | "aren't" | "won't" | "can't" | "cannot"
            | "without"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_scores_zero() {
        let a = SentimentAnalyzer::new();
        assert_eq!(a.compound("the quarterly report is out"), 0.0);
        assert_eq!(
            a.classify("the quarterly report is out"),
            SentimentClass::Neutral
        );
    }

    #[test]
    fn two_bullish_cues_hit_the_positive_boundary() {
        let a = SentimentAnalyzer::new();
        // No lexicon words, so base compound is exactly 0.0; two cues land on
        // the 0.2 boundary, which classifies positive (>=).
        let text = "TSLA calls, we ride the rocket";
        assert_eq!(a.compound(text), 0.0);
        assert!((a.adjusted_score(text) - 0.2).abs() < 1e-9);
        assert_eq!(a.classify(text), SentimentClass::Positive);
    }

    #[test]
    fn bearish_cues_pull_negative() {
        let a = SentimentAnalyzer::new();
        let text = "dump it before the crash, then short the bounce";
        assert_eq!(a.classify(text), SentimentClass::Negative);
    }

    #[test]
    fn cues_cancel_each_other() {
        let a = SentimentAnalyzer::new();
        let text = "some buy, some sell";
        assert_eq!(a.adjusted_score(text), a.compound(text));
    }

    #[test]
    fn negation_flips_lexicon_words() {
        let a = SentimentAnalyzer::new();
        let plain = a.compound("this is good");
        let negated = a.compound("this is not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[test]
    fn adjustment_clamps_at_one() {
        let a = SentimentAnalyzer::new();
        let text = "buy buy buy long calls moon rocket bullish pump growth \
                    buy long calls moon rocket";
        assert!(a.adjusted_score(text) <= 1.0);
    }

    #[test]
    fn lexicon_moves_the_compound() {
        let a = SentimentAnalyzer::new();
        assert!(a.compound("great earnings, strong growth story") > 0.0);
        assert!(a.compound("terrible losses, awful guidance") < 0.0);
    }
}
