use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Completed,
    Pending,
}

/// Population-level indicators. Scores are 0–100; counts are unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Indicators {
    pub memory_score: u32,
    pub narrative_coherence: u32,
    pub omissions: u32,
    pub memory_errors: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Per-photo analysis result. Derived; never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDescription {
    pub photo_id: String,
    pub photo_name: String,
    pub description: String,
    pub word_count: usize,
    pub coherence_score: u32,
    pub memory_accuracy: u32,
}

/// Immutable baseline assessment. At most one exists per patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaselineReport {
    pub id: Uuid,
    pub patient_id: String,
    pub patient_name: String,
    pub session_date: DateTime<Utc>,
    pub generated_date: DateTime<Utc>,
    pub status: ReportStatus,
    pub indicators: Indicators,
    pub photos_described: usize,
    pub total_photos: usize,
    pub descriptions: Vec<PhotoDescription>,
    pub analysis: Analysis,
}
