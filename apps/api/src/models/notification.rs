use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewBaselineReport,
}

/// Doctor-facing record pointing at a freshly generated report.
/// `read` is only flipped by the doctor UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorNotification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub report_id: Uuid,
    pub patient_name: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub read: bool,
}
