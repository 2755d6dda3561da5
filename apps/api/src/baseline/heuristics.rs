//! Lexical primitives shared by the per-photo analyzer and the aggregate scorer.
//!
//! Everything here is deterministic string inspection. Lengths are counted in
//! characters, not bytes, so accented Spanish text measures the same as ASCII.

use std::sync::LazyLock;

use regex::Regex;

/// Year-mention heuristic.
static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("Invalid year regex"));

/// Sequential discourse markers.
static RE_SEQUENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)primero|luego|después|finalmente").expect("Invalid sequence marker regex")
});

static RE_RECALL_VERBS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)recuerdo|recuerda").expect("Invalid recall verb regex"));

/// Causal connectives, matched case-sensitively.
const CAUSAL_CONNECTIVES: &[&str] = &["porque", "ya que"];

/// Self-reported uncertainty, matched against the lower-cased description.
const UNCERTAINTY_MARKERS: &[&str] = &["no recuerdo", "creo que"];

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of non-empty sentences when splitting on `.`, `!` and `?`.
pub fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Raw number of period-delimited segments, empty fragments included.
/// "Uno. Dos." yields 3.
pub fn period_segments(text: &str) -> usize {
    text.split('.').count()
}

/// First whitespace-delimited token of a metadata field, lower-cased.
/// `None` when the field holds no token at all.
pub fn first_token_lower(field: &str) -> Option<String> {
    field.split_whitespace().next().map(str::to_lowercase)
}

/// Tokens of the `people` field, split on whitespace and commas.
pub fn people_tokens_lower(people: &str) -> Vec<String> {
    people
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the lower-cased description names the first token of `field`.
/// `None` when the field is blank, so callers neither reward nor penalise it.
/// Splitting on a single space and testing the empty first piece would match
/// every description; a blank field is treated as "no token" instead.
pub fn mentions_first_token(description_lower: &str, field: &str) -> Option<bool> {
    first_token_lower(field).map(|token| description_lower.contains(&token))
}

pub fn mentions_year(text: &str) -> bool {
    RE_YEAR.is_match(text)
}

pub fn has_sequence_marker(text: &str) -> bool {
    RE_SEQUENCE_MARKERS.is_match(text)
}

pub fn has_recall_verb(text: &str) -> bool {
    RE_RECALL_VERBS.is_match(text)
}

pub fn has_causal_connective(text: &str) -> bool {
    CAUSAL_CONNECTIVES.iter().any(|c| text.contains(c))
}

pub fn has_uncertainty_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    UNCERTAINTY_MARKERS.iter().any(|m| lower.contains(m))
}
