use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::baseline::eligibility::should_generate_baseline_report;
use crate::baseline::generator::assemble_report;
use crate::baseline::pipeline::{run_baseline_pipeline, BaselineOutcome};
use crate::errors::AppError;
use crate::models::notification::DoctorNotification;
use crate::models::photo::Photo;
use crate::models::report::BaselineReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBaselineRequest {
    pub patient_name: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
}

/// POST /api/v1/patients/:patient_id/baseline/eligibility
/// Lets the client ask before generating. Writes nothing.
pub async fn handle_baseline_eligibility(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(req): Json<EligibilityRequest>,
) -> Json<EligibilityResponse> {
    let eligible =
        should_generate_baseline_report(state.reports.as_ref(), &patient_id, &req.photos).await;
    Json(EligibilityResponse { eligible })
}

/// POST /api/v1/patients/:patient_id/baseline
pub async fn handle_generate_baseline(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(req): Json<GenerateBaselineRequest>,
) -> Json<BaselineOutcome> {
    let outcome = run_baseline_pipeline(
        state.reports.as_ref(),
        state.notifications.as_ref(),
        &state.patient_locks,
        &patient_id,
        &req.patient_name,
        &req.photos,
    )
    .await;
    Json(outcome)
}

/// POST /api/v1/baseline/preview
/// Scores a photo set without persisting anything.
pub async fn handle_preview(
    Json(req): Json<PreviewRequest>,
) -> Result<Json<BaselineReport>, AppError> {
    assemble_report(&req.patient_id, &req.patient_name, &req.photos, Utc::now())
        .map(Json)
        .ok_or_else(|| {
            AppError::UnprocessableEntity("No photo in the set has a description".to_string())
        })
}

/// GET /api/v1/patients/:patient_id/reports
pub async fn handle_patient_reports(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<BaselineReport>>, AppError> {
    Ok(Json(state.reports.find_by_patient(&patient_id).await?))
}

/// GET /api/v1/reports
pub async fn handle_list_reports(
    State(state): State<AppState>,
) -> Result<Json<Vec<BaselineReport>>, AppError> {
    Ok(Json(state.reports.all().await?))
}

/// GET /api/v1/reports/:id
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BaselineReport>, AppError> {
    state
        .reports
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
}

/// GET /api/v1/notifications
pub async fn handle_list_notifications(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorNotification>>, AppError> {
    Ok(Json(state.notifications.list().await?))
}

/// PATCH /api/v1/notifications/:id/read
pub async fn handle_mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.notifications.mark_read(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notification {id} not found")))
    }
}
