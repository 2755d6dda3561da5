//! Report and notification persistence.
//!
//! The engine only ever reads reports by patient and appends records; listing
//! and `mark_read` exist for the doctor-facing endpoints.
//!
//! `AppState` holds `Arc<dyn ReportRepository>` / `Arc<dyn NotificationRepository>`,
//! picked at startup from `STORE_BACKEND`.

pub mod kv;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::models::notification::DoctorNotification;
use crate::models::report::BaselineReport;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored data is malformed: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<BaselineReport>, StoreError>;

    async fn find_by_patient(&self, patient_id: &str) -> Result<Vec<BaselineReport>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BaselineReport>, StoreError>;

    /// Append-only. Never overwrites or deduplicates in memory or Redis; the
    /// Postgres backend rejects a second report for the same patient with
    /// `StoreError::Database` (unique index on `patient_id`).
    async fn append(&self, report: &BaselineReport) -> Result<(), StoreError>;

    /// Cheap reachability check for `/health`. Reads no report bodies.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn append(&self, notification: &DoctorNotification) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<DoctorNotification>, StoreError>;

    /// Returns `false` when no notification has this id.
    async fn mark_read(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub type Repositories = (Arc<dyn ReportRepository>, Arc<dyn NotificationRepository>);

/// Builds the repositories for the configured backend.
pub async fn build_repositories(config: &Config) -> Result<Repositories> {
    let repositories: Repositories = match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory report store");
            let reports: Arc<dyn ReportRepository> =
                Arc::new(memory::MemoryStore::<BaselineReport>::default());
            let notifications: Arc<dyn NotificationRepository> =
                Arc::new(memory::MemoryStore::<DoctorNotification>::default());
            (reports, notifications)
        }
        StoreBackend::Redis => {
            let client = redis::Client::open(config.require_redis_url()?)?;
            let conn = client.get_multiplexed_async_connection().await?;
            info!("Redis report store initialized");
            let reports: Arc<dyn ReportRepository> = Arc::new(kv::JsonListStore::<BaselineReport>::new(
                conn.clone(),
                &config.redis_key_prefix,
                kv::REPORTS_KEY,
            ));
            let notifications: Arc<dyn NotificationRepository> =
                Arc::new(kv::JsonListStore::<DoctorNotification>::new(
                    conn,
                    &config.redis_key_prefix,
                    kv::NOTIFICATIONS_KEY,
                ));
            (reports, notifications)
        }
        StoreBackend::Postgres => {
            let pool = postgres::connect(config.require_database_url()?).await?;
            let reports: Arc<dyn ReportRepository> =
                Arc::new(postgres::PgReportRepository::new(pool.clone()));
            let notifications: Arc<dyn NotificationRepository> =
                Arc::new(postgres::PgNotificationRepository::new(pool));
            (reports, notifications)
        }
    };
    Ok(repositories)
}
