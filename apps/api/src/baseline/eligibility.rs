//! Eligibility check — a baseline report is generated the first time, and only
//! the first time, every photo in a patient's set has been described.

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::photo::Photo;
use crate::store::ReportRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    NoPhotos,
    IncompletePhotos,
    AlreadyGenerated,
    /// The store could not be read. Treated as "a report may already exist".
    StoreUnavailable,
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

/// Decides whether a baseline report should be produced, with the reason when not.
///
/// Fails closed: an unreadable or malformed store blocks generation.
pub async fn check_eligibility(
    reports: &dyn ReportRepository,
    patient_id: &str,
    photos: &[Photo],
) -> Eligibility {
    if photos.is_empty() {
        return Eligibility::NoPhotos;
    }
    if !photos.iter().all(Photo::is_described) {
        return Eligibility::IncompletePhotos;
    }

    match reports.find_by_patient(patient_id).await {
        Ok(existing) if existing.is_empty() => Eligibility::Eligible,
        Ok(existing) => {
            debug!(
                "Patient {patient_id} already has {} baseline report(s)",
                existing.len()
            );
            Eligibility::AlreadyGenerated
        }
        Err(e) => {
            warn!("Could not read reports for patient {patient_id}, refusing generation: {e}");
            Eligibility::StoreUnavailable
        }
    }
}

/// `true` only for the first fully described photo set of a patient.
pub async fn should_generate_baseline_report(
    reports: &dyn ReportRepository,
    patient_id: &str,
    photos: &[Photo],
) -> bool {
    check_eligibility(reports, patient_id, photos)
        .await
        .is_eligible()
}
