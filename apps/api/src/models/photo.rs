use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A caregiver-supplied memory prompt. Only `description` is ever written by the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub people: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Photo {
    /// Returns the verbatim description if it is non-empty after trimming.
    pub fn described_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }

    pub fn is_described(&self) -> bool {
        self.described_text().is_some()
    }
}
