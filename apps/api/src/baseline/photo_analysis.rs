//! Per-photo analyzer — scores one description against its own photo's metadata.
//!
//! Coherence (base 50, cap 100):
//!   +15 three or more sentences, +10 causal connective,
//!   +10 sequential marker, +15 longer than 150 characters.
//!
//! Memory accuracy (base 50, cap 100):
//!   +20 first `people` token named, +20 first `location` token named,
//!   +10 a four-digit year.

use serde::{Deserialize, Serialize};

use crate::baseline::heuristics::{
    char_len, has_causal_connective, has_sequence_marker, mentions_first_token, mentions_year,
    sentence_count, word_count,
};
use crate::models::photo::Photo;
use crate::models::report::PhotoDescription;

const BASE_SCORE: u32 = 50;
const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoScores {
    pub coherence_score: u32,
    pub memory_accuracy: u32,
}

/// Scores a photo's description. An undescribed photo is scored as empty text.
pub fn analyze_photo(photo: &Photo) -> PhotoScores {
    let description = photo.described_text().unwrap_or_default();
    PhotoScores {
        coherence_score: coherence_score(description),
        memory_accuracy: memory_accuracy(description, &photo.people, &photo.location),
    }
}

/// Builds the report entry for a described photo; `None` otherwise.
pub fn describe_photo(photo: &Photo) -> Option<PhotoDescription> {
    let description = photo.described_text()?;
    let scores = analyze_photo(photo);
    Some(PhotoDescription {
        photo_id: photo.id.clone(),
        photo_name: photo.file_name.clone(),
        description: description.to_string(),
        word_count: word_count(description),
        coherence_score: scores.coherence_score,
        memory_accuracy: scores.memory_accuracy,
    })
}

pub fn coherence_score(description: &str) -> u32 {
    let mut score = BASE_SCORE;
    if sentence_count(description) >= 3 {
        score += 15;
    }
    if has_causal_connective(description) {
        score += 10;
    }
    if has_sequence_marker(description) {
        score += 10;
    }
    if char_len(description) > 150 {
        score += 15;
    }
    score.min(MAX_SCORE)
}

pub fn memory_accuracy(description: &str, people: &str, location: &str) -> u32 {
    let description_lower = description.to_lowercase();
    let mut score = BASE_SCORE;
    if mentions_first_token(&description_lower, people) == Some(true) {
        score += 20;
    }
    if mentions_first_token(&description_lower, location) == Some(true) {
        score += 20;
    }
    if mentions_year(description) {
        score += 10;
    }
    score.min(MAX_SCORE)
}
