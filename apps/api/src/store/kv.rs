//! Redis-backed store. Each collection is one JSON array under a single key,
//! the same layout the browser client keeps in local storage.
//!
//! Writes are read-modify-write under a process-local mutex. Running several
//! API processes against one Redis needs external serialisation.

use std::marker::PhantomData;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::models::notification::DoctorNotification;
use crate::models::report::BaselineReport;
use crate::store::{NotificationRepository, ReportRepository, StoreError};

pub const REPORTS_KEY: &str = "baseline_reports";
pub const NOTIFICATIONS_KEY: &str = "doctor_notifications";

pub struct JsonListStore<T> {
    conn: MultiplexedConnection,
    key: String,
    write_lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(conn: MultiplexedConnection, prefix: &str, collection: &str) -> Self {
        Self {
            conn,
            key: format!("{prefix}:{collection}"),
            write_lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    async fn load(&self) -> Result<Vec<T>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&self.key).await?;
        decode_list(raw.as_deref())
    }

    async fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(items)?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(&self.key, encoded).await?;
        debug!("Wrote {} records to {}", items.len(), self.key);
        Ok(())
    }

    async fn push(&self, item: &T) -> Result<(), StoreError>
    where
        T: Clone,
    {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        items.push(item.clone());
        self.save(&items).await
    }
}

/// A missing key is an empty list; anything unparsable is `Corrupt`.
fn decode_list<T: DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>, StoreError> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => Ok(serde_json::from_str(s)?),
    }
}

#[async_trait]
impl ReportRepository for JsonListStore<BaselineReport> {
    async fn all(&self) -> Result<Vec<BaselineReport>, StoreError> {
        self.load().await
    }

    async fn find_by_patient(&self, patient_id: &str) -> Result<Vec<BaselineReport>, StoreError> {
        let mut reports = self.load().await?;
        reports.retain(|r| r.patient_id == patient_id);
        Ok(reports)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BaselineReport>, StoreError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }

    async fn append(&self, report: &BaselineReport) -> Result<(), StoreError> {
        self.push(report).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.exists::<_, bool>(&self.key).await?;
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for JsonListStore<DoctorNotification> {
    async fn append(&self, notification: &DoctorNotification) -> Result<(), StoreError> {
        self.push(notification).await
    }

    async fn list(&self) -> Result<Vec<DoctorNotification>, StoreError> {
        self.load().await
    }

    async fn mark_read(&self, id: Uuid) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut notifications = self.load().await?;
        let Some(notification) = notifications.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        notification.read = true;
        self.save(&notifications).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_empty() {
        let reports: Vec<BaselineReport> = decode_list(None).unwrap();
        assert!(reports.is_empty());
        let reports: Vec<BaselineReport> = decode_list(Some("  ")).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_malformed_payload_is_corrupt() {
        let result: Result<Vec<BaselineReport>, _> = decode_list(Some("[{\"id\":"));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));

        let result: Result<Vec<BaselineReport>, _> = decode_list(Some("{\"not\":\"a list\"}"));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_decodes_stored_notifications() {
        let raw = r#"[{"id":"5f0c6f3e-8a7a-4b8e-9a53-0d6f0f5b9c11","type":"new_baseline_report",
            "reportId":"0b9d2c1e-3f4a-4c5b-8d6e-7f8091a2b3c4","patientName":"Ana",
            "message":"Nuevo informe","date":"2024-03-01T10:00:00Z","read":false}]"#;
        let notifications: Vec<DoctorNotification> = decode_list(Some(raw)).unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].patient_name, "Ana");
        assert!(!notifications[0].read);
    }
}
