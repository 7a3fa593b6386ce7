use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Entry;

/// UI text that must never be mistaken for a model name. Matched as
/// lowercase substrings, full phrases where partial hits would be wrong.
const IGNORE_PATTERNS: &[&str] = &[
    "add model",
    "specific provider",
    "artificial analysis",
    "benchmark",
    "leaderboard",
    "filter",
    "incorporates",
    "evaluations",
    "represents",
    "average",
    "open weights",
    "proprietary",
    "non-reasoning",
    "coding index",
    "agentic index",
    "intelligence index",
    "higher is better",
    "click here",
    "select",
    "compare models",
    "view all",
    "show more",
    "hide",
    "show less",
    "subscribe",
    "newsletter",
    "contact us",
    "about us",
    "privacy",
    "terms of",
    "cookie",
    "sign in",
    "log in",
    "register",
];

static MODELS_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s+of\s+\d+\s+models?$").expect("invalid models-count regex"));

static NAME_CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\s\-.()]+$").expect("invalid name charset regex"));

static EMOJI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{1F300}-\x{1F9FF}]").expect("invalid emoji regex"));

/// Chart scores are bare one- or two-digit integers.
pub fn score_of(line: &str) -> Option<f64> {
    let trimmed = line.trim();
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed
        .parse::<u32>()
        .ok()
        .filter(|v| (10..=99).contains(v))
        .map(f64::from)
}

/// Heuristic classification instead of a known-model list, so new models
/// are picked up without code changes.
pub fn is_model_name(text: &str) -> bool {
    let text = text.trim();
    if text.len() < 2 || text.len() > 80 {
        return false;
    }

    let lower = text.to_lowercase();
    if IGNORE_PATTERNS.iter().any(|pat| lower.contains(pat)) {
        return false;
    }
    // "25 of 342 models" style counters.
    if MODELS_COUNT_RE.is_match(&lower) {
        return false;
    }
    if text.starts_with(['+', '×', '•', '→', '←', '↑', '↓']) {
        return false;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    // Sentences, not names.
    if text.matches(' ').count() > 6 {
        return false;
    }
    if text.ends_with(['.', '!', '?', ':']) {
        return false;
    }
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.") {
        return false;
    }
    if !NAME_CHARSET_RE.is_match(text) {
        return false;
    }
    text.chars().any(char::is_alphabetic)
}

pub fn clean_model_name(text: &str) -> Option<String> {
    let stripped = EMOJI_RE.replace_all(text, "");
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.len() > 2 {
        Some(cleaned)
    } else {
        None
    }
}

/// Chart sections list model names and scores in matching order; pair them
/// up positionally. Lines that classify as neither are skipped, so one
/// malformed row never poisons the rest of the table.
pub fn extract_entries(lines: &[&str]) -> Vec<Entry> {
    let mut names = Vec::new();
    let mut scores = Vec::new();

    for line in lines {
        if let Some(score) = score_of(line) {
            scores.push(score);
        } else if is_model_name(line) {
            if let Some(name) = clean_model_name(line) {
                names.push(name);
            }
        }
    }

    names
        .into_iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (model, score))| Entry::new(i as u32 + 1, model, score))
        .collect()
}
