//! Report assembler and doctor notifier.
//!
//! Store writes are best-effort: a failed append is logged and the in-memory
//! record is still handed back. The pipeline reads the report back before it
//! notifies anyone.

use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::baseline::aggregate::score_photos;
use crate::baseline::photo_analysis::describe_photo;
use crate::models::notification::{DoctorNotification, NotificationType};
use crate::models::photo::Photo;
use crate::models::report::{BaselineReport, PhotoDescription, ReportStatus};
use crate::store::{NotificationRepository, ReportRepository, StoreError};

/// Builds a report without touching any store.
/// `None` when there is nothing described to assemble.
pub fn assemble_report(
    patient_id: &str,
    patient_name: &str,
    photos: &[Photo],
    generated_at: DateTime<Utc>,
) -> Option<BaselineReport> {
    let descriptions: Vec<PhotoDescription> = photos.iter().filter_map(describe_photo).collect();
    if descriptions.is_empty() {
        return None;
    }

    let scores = score_photos(photos);
    let status = if descriptions.len() == photos.len() {
        ReportStatus::Completed
    } else {
        ReportStatus::Pending
    };

    Some(BaselineReport {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        patient_name: patient_name.to_string(),
        session_date: generated_at,
        generated_date: generated_at,
        status,
        indicators: scores.indicators,
        photos_described: descriptions.len(),
        total_photos: photos.len(),
        descriptions,
        analysis: scores.analysis,
    })
}

/// Assembles a report and appends it to the store.
pub async fn generate_baseline_report(
    reports: &dyn ReportRepository,
    patient_id: &str,
    patient_name: &str,
    photos: &[Photo],
) -> Option<BaselineReport> {
    let report = assemble_report(patient_id, patient_name, photos, Utc::now())?;

    if let Err(e) = persist_report(reports, &report).await {
        error!(
            "Failed to store baseline report {} for patient {patient_id}: {e}",
            report.id
        );
    }

    Some(report)
}

async fn persist_report(
    reports: &dyn ReportRepository,
    report: &BaselineReport,
) -> Result<(), StoreError> {
    reports.append(report).await?;
    info!(
        "Stored baseline report {} for patient {} ({}/{} photos described)",
        report.id, report.patient_id, report.photos_described, report.total_photos
    );
    Ok(())
}

pub fn build_notification(
    report_id: Uuid,
    patient_name: &str,
    date: DateTime<Utc>,
) -> DoctorNotification {
    DoctorNotification {
        id: Uuid::new_v4(),
        kind: NotificationType::NewBaselineReport,
        report_id,
        patient_name: patient_name.to_string(),
        message: format!("Nuevo informe de línea base disponible para {patient_name}"),
        date,
        read: false,
    }
}

/// Records a doctor notification for a freshly generated report.
pub async fn notify_doctor_about_new_report(
    notifications: &dyn NotificationRepository,
    report_id: Uuid,
    patient_name: &str,
) -> DoctorNotification {
    let notification = build_notification(report_id, patient_name, Utc::now());

    match notifications.append(&notification).await {
        Ok(()) => info!("Doctor notified about baseline report {report_id}"),
        Err(e) => error!("Failed to store notification for report {report_id}: {e}"),
    }

    notification
}
