use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::notification::DoctorNotification;
use crate::models::report::BaselineReport;
use crate::store::{NotificationRepository, ReportRepository, StoreError};

/// Process-local append-only list. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryStore<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReportRepository for MemoryStore<BaselineReport> {
    async fn all(&self) -> Result<Vec<BaselineReport>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn find_by_patient(&self, patient_id: &str) -> Result<Vec<BaselineReport>, StoreError> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BaselineReport>, StoreError> {
        Ok(self.items.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn append(&self, report: &BaselineReport) -> Result<(), StoreError> {
        self.items.write().await.push(report.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore<DoctorNotification> {
    async fn append(&self, notification: &DoctorNotification) -> Result<(), StoreError> {
        self.items.write().await.push(notification.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DoctorNotification>, StoreError> {
        Ok(self.items.read().await.clone())
    }

    async fn mark_read(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
