pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::baseline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Baseline engine
        .route(
            "/api/v1/patients/:patient_id/baseline",
            post(handlers::handle_generate_baseline),
        )
        .route(
            "/api/v1/patients/:patient_id/baseline/eligibility",
            post(handlers::handle_baseline_eligibility),
        )
        .route("/api/v1/baseline/preview", post(handlers::handle_preview))
        // Doctor-facing reads
        .route(
            "/api/v1/patients/:patient_id/reports",
            get(handlers::handle_patient_reports),
        )
        .route("/api/v1/reports", get(handlers::handle_list_reports))
        .route("/api/v1/reports/:id", get(handlers::handle_get_report))
        .route(
            "/api/v1/notifications",
            get(handlers::handle_list_notifications),
        )
        .route(
            "/api/v1/notifications/:id/read",
            patch(handlers::handle_mark_notification_read),
        )
        .with_state(state)
}
