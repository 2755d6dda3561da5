use std::sync::Arc;

use crate::baseline::pipeline::PatientLocks;
use crate::store::{NotificationRepository, Repositories, ReportRepository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<dyn ReportRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    /// Serialises baseline generation per patient within this process.
    pub patient_locks: Arc<PatientLocks>,
}

impl AppState {
    pub fn new((reports, notifications): Repositories) -> Self {
        Self {
            reports,
            notifications,
            patient_locks: Arc::new(PatientLocks::default()),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use crate::models::notification::DoctorNotification;
        use crate::models::report::BaselineReport;
        use crate::store::memory::MemoryStore;

        let reports: Arc<dyn ReportRepository> = Arc::new(MemoryStore::<BaselineReport>::default());
        let notifications: Arc<dyn NotificationRepository> =
            Arc::new(MemoryStore::<DoctorNotification>::default());
        Self::new((reports, notifications))
    }
}
