use std::sync::OnceLock;

use regex::Regex;

use crate::strategy::OcrCandidate;

/// Vocabulary we expect on a payment receipt. Each occurrence is worth 50
/// points, so a candidate that kept the labels beats one that garbled them.
const RECEIPT_KEYWORDS: &[&str] = &[
    "total",
    "amount",
    "date",
    "payment",
    "transfer",
    "account",
    "bank",
    "received",
    "payer",
    "invoice",
    "receipt",
    "reference",
    "commission",
    "etb",
    "usd",
    "eur",
    "gbp",
    "service",
    "charge",
    "merchant",
];

/// Length reward saturates here so verbose garbage cannot out-score a short,
/// clean read.
const LENGTH_CAP: usize = 2000;

fn re_number() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\d+").expect("invalid regex"))
}

fn re_key_value_line() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\w+\s*:\s*\S+").expect("invalid regex"))
}

/// Deterministic quality heuristic for one OCR output — higher is better.
///
/// Additive terms: capped length, receipt-keyword occurrences, numeric-token
/// density, `key: value` structure; one subtractive term penalizes the ratio
/// of garbage characters typical of a bad segmentation mode.
pub fn score_text(text: &str) -> i64 {
    if text.trim().is_empty() {
        return 0;
    }

    let chars = text.chars().count();
    let mut score = chars.min(LENGTH_CAP) as i64;

    let lower = text.to_lowercase();
    for keyword in RECEIPT_KEYWORDS {
        score += 50 * lower.matches(keyword).count() as i64;
    }

    score += 10 * re_number().find_iter(text).count() as i64;
    score += 30 * re_key_value_line().find_iter(text).count() as i64;

    let garbage = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && !".,/:;-".contains(*c))
        .count();
    score -= (garbage as f64 / chars as f64 * 500.0) as i64;

    score
}

/// Pick the winning candidate. Ties break toward the first-seen strategy,
/// which the runner guarantees is strategy-table order.
pub fn select_best(candidates: &[OcrCandidate]) -> Option<&OcrCandidate> {
    // max_by would keep the last of equal elements; find the first instead.
    let best = candidates.iter().map(|c| c.quality_score).max()?;
    candidates.iter().find(|c| c.quality_score == best)
}
