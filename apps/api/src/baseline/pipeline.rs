//! Orchestration: eligibility → generation → doctor notification.
//!
//! The eligibility check is read-then-write, so concurrent requests for one
//! patient are serialised here by a per-patient lock held across all three steps.
//! A report is only announced to the doctor once the store has accepted it.

use std::collections::HashMap;
use std::sync::{Arc, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::baseline::eligibility::{check_eligibility, Eligibility};
use crate::baseline::generator::{generate_baseline_report, notify_doctor_about_new_report};
use crate::models::notification::DoctorNotification;
use crate::models::photo::Photo;
use crate::models::report::BaselineReport;
use crate::store::{NotificationRepository, ReportRepository};

type LockTable = HashMap<String, Arc<Mutex<()>>>;

/// One async mutex per patient id. An entry lives only while some request
/// holds or waits on it.
#[derive(Default)]
pub struct PatientLocks {
    locks: std::sync::Mutex<LockTable>,
}

impl PatientLocks {
    fn table(&self) -> MutexGuard<'_, LockTable> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, patient_id: &str) -> PatientLock<'_> {
        let lock = self
            .table()
            .entry(patient_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        PatientLock {
            locks: self,
            patient_id: patient_id.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table().len()
    }
}

/// A reference to one patient's mutex. Dropping the last one removes the
/// table entry, including when the request is cancelled while waiting.
struct PatientLock<'a> {
    locks: &'a PatientLocks,
    patient_id: String,
    lock: Arc<Mutex<()>>,
}

impl PatientLock<'_> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for PatientLock<'_> {
    fn drop(&mut self) {
        let mut table = self.locks.table();
        // One reference in the table, one here: nobody else is queued.
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.patient_id);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BaselineOutcome {
    Generated {
        report: BaselineReport,
        notification: DoctorNotification,
    },
    Skipped {
        reason: Eligibility,
    },
}

pub async fn run_baseline_pipeline(
    reports: &dyn ReportRepository,
    notifications: &dyn NotificationRepository,
    locks: &PatientLocks,
    patient_id: &str,
    patient_name: &str,
    photos: &[Photo],
) -> BaselineOutcome {
    let patient_lock = locks.entry(patient_id);
    let _guard = patient_lock.lock().await;

    let eligibility = check_eligibility(reports, patient_id, photos).await;
    if !eligibility.is_eligible() {
        info!("Baseline report for patient {patient_id} skipped: {eligibility:?}");
        return BaselineOutcome::Skipped {
            reason: eligibility,
        };
    }

    // Eligibility guarantees every photo is described, so assembly always yields a report.
    let Some(report) = generate_baseline_report(reports, patient_id, patient_name, photos).await
    else {
        return BaselineOutcome::Skipped {
            reason: Eligibility::IncompletePhotos,
        };
    };
    // A failed or rejected append leaves nothing for the notification to point at.
    match reports.find_by_id(report.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            error!(
                "Baseline report {} for patient {patient_id} is not in the store, doctor not notified",
                report.id
            );
            return BaselineOutcome::Skipped {
                reason: Eligibility::StoreUnavailable,
            };
        }
        Err(e) => {
            error!(
                "Could not confirm baseline report {} for patient {patient_id}, doctor not notified: {e}",
                report.id
            );
            return BaselineOutcome::Skipped {
                reason: Eligibility::StoreUnavailable,
            };
        }
    }
    let notification = notify_doctor_about_new_report(notifications, report.id, patient_name).await;

    BaselineOutcome::Generated {
        report,
        notification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::baseline::eligibility::tests::corrupt;
    use crate::models::report::ReportStatus;
    use crate::store::memory::MemoryStore;
    use crate::store::StoreError;

    /// Reads succeed and see nothing; every append is refused.
    struct WriteFailingStore;

    #[async_trait]
    impl ReportRepository for WriteFailingStore {
        async fn all(&self) -> Result<Vec<BaselineReport>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_by_patient(&self, _patient_id: &str) -> Result<Vec<BaselineReport>, StoreError> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<BaselineReport>, StoreError> {
            Ok(None)
        }

        async fn append(&self, _report: &BaselineReport) -> Result<(), StoreError> {
            Err(corrupt())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn described(id: &str, description: &str) -> Photo {
        Photo {
            id: id.to_string(),
            patient_id: "pat-1".to_string(),
            people: "Ana".to_string(),
            location: "Playa".to_string(),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generates_once_then_skips() {
        let reports = MemoryStore::<BaselineReport>::default();
        let notifications = MemoryStore::<DoctorNotification>::default();
        let locks = PatientLocks::default();
        let photos = vec![described("a", "Ana en la playa en 1990.")];

        let first =
            run_baseline_pipeline(&reports, &notifications, &locks, "pat-1", "Ana", &photos).await;
        let (report, notification) = match first {
            BaselineOutcome::Generated {
                report,
                notification,
            } => (report, notification),
            other => panic!("expected a generated report, got {other:?}"),
        };
        assert_eq!(report.status, ReportStatus::Completed);
        assert_eq!(notification.report_id, report.id);

        let second =
            run_baseline_pipeline(&reports, &notifications, &locks, "pat-1", "Ana", &photos).await;
        assert!(matches!(
            second,
            BaselineOutcome::Skipped {
                reason: Eligibility::AlreadyGenerated
            }
        ));
        assert_eq!(reports.all().await.unwrap().len(), 1);
        assert_eq!(notifications.list().await.unwrap().len(), 1);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_rejected_write_is_not_announced() {
        let notifications = MemoryStore::<DoctorNotification>::default();
        let locks = PatientLocks::default();
        let photos = vec![described("a", "Ana en la playa en 1990.")];

        let outcome = run_baseline_pipeline(
            &WriteFailingStore,
            &notifications,
            &locks,
            "pat-1",
            "Ana",
            &photos,
        )
        .await;
        assert!(matches!(
            outcome,
            BaselineOutcome::Skipped {
                reason: Eligibility::StoreUnavailable
            }
        ));
        assert!(notifications.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lock_table_is_emptied_after_each_request() {
        let reports = MemoryStore::<BaselineReport>::default();
        let notifications = MemoryStore::<DoctorNotification>::default();
        let locks = PatientLocks::default();

        for i in 0..100 {
            let patient_id = format!("pat-{i}");
            let outcome =
                run_baseline_pipeline(&reports, &notifications, &locks, &patient_id, "Ana", &[])
                    .await;
            assert!(matches!(
                outcome,
                BaselineOutcome::Skipped {
                    reason: Eligibility::NoPhotos
                }
            ));
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_waiting_request_keeps_entry_alive() {
        let locks = PatientLocks::default();

        let first = locks.entry("pat-1");
        let guard = first.lock().await;
        let second = locks.entry("pat-1");
        drop(guard);
        drop(first);
        assert_eq!(locks.len(), 1);

        let again = locks.entry("pat-1");
        assert!(Arc::ptr_eq(&again.lock, &second.lock));
        drop(second);
        drop(again);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_incomplete_set_writes_nothing() {
        let reports = MemoryStore::<BaselineReport>::default();
        let notifications = MemoryStore::<DoctorNotification>::default();
        let locks = PatientLocks::default();
        let mut pending = described("b", "");
        pending.description = None;
        let photos = vec![described("a", "Ana en la playa."), pending];

        let outcome =
            run_baseline_pipeline(&reports, &notifications, &locks, "pat-1", "Ana", &photos).await;
        assert!(matches!(
            outcome,
            BaselineOutcome::Skipped {
                reason: Eligibility::IncompletePhotos
            }
        ));
        assert!(reports.all().await.unwrap().is_empty());
        assert!(notifications.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_produce_one_report() {
        let reports = Arc::new(MemoryStore::<BaselineReport>::default());
        let notifications = Arc::new(MemoryStore::<DoctorNotification>::default());
        let locks = Arc::new(PatientLocks::default());
        let photos = Arc::new(vec![described("a", "Ana en la playa.")]);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let (reports, notifications, locks, photos) = (
                reports.clone(),
                notifications.clone(),
                locks.clone(),
                photos.clone(),
            );
            handles.push(tokio::spawn(async move {
                run_baseline_pipeline(
                    reports.as_ref(),
                    notifications.as_ref(),
                    &locks,
                    "pat-1",
                    "Ana",
                    &photos,
                )
                .await
            }));
        }

        let mut generated = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), BaselineOutcome::Generated { .. }) {
                generated += 1;
            }
        }
        assert_eq!(generated, 1);
        assert_eq!(reports.find_by_patient("pat-1").await.unwrap().len(), 1);
        assert_eq!(notifications.list().await.unwrap().len(), 1);
        assert_eq!(locks.len(), 0);
    }
}
