//! PostgreSQL-backed store. Records are kept whole in a JSONB `body` column,
//! with the lookup keys pulled out into their own columns.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::notification::DoctorNotification;
use crate::models::report::BaselineReport;
use crate::store::{NotificationRepository, ReportRepository, StoreError};

/// Opens the connection pool and makes sure the tables exist.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    ensure_schema(&pool).await?;

    info!("PostgreSQL report store ready");
    Ok(pool)
}

/// Creates the tables if they do not exist yet.
///
/// The unique index on `patient_id` makes a second baseline for the same
/// patient fail at insert time even when two eligibility checks race.
async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS baseline_reports (
            id          UUID PRIMARY KEY,
            patient_id  TEXT NOT NULL,
            body        JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS baseline_reports_patient_id_key ON baseline_reports (patient_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctor_notifications (
            id          UUID PRIMARY KEY,
            report_id   UUID NOT NULL,
            body        JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn all(&self) -> Result<Vec<BaselineReport>, StoreError> {
        let rows: Vec<Json<BaselineReport>> =
            sqlx::query_scalar("SELECT body FROM baseline_reports ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(r)| r).collect())
    }

    async fn find_by_patient(&self, patient_id: &str) -> Result<Vec<BaselineReport>, StoreError> {
        let rows: Vec<Json<BaselineReport>> = sqlx::query_scalar(
            "SELECT body FROM baseline_reports WHERE patient_id = $1 ORDER BY created_at ASC",
        )
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(r)| r).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BaselineReport>, StoreError> {
        let row: Option<Json<BaselineReport>> =
            sqlx::query_scalar("SELECT body FROM baseline_reports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(r)| r))
    }

    async fn append(&self, report: &BaselineReport) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO baseline_reports (id, patient_id, body, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(report.id)
        .bind(&report.patient_id)
        .bind(Json(report))
        .bind(report.generated_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn append(&self, notification: &DoctorNotification) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO doctor_notifications (id, report_id, body, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(notification.id)
        .bind(notification.report_id)
        .bind(Json(notification))
        .bind(notification.date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<DoctorNotification>, StoreError> {
        let rows: Vec<Json<DoctorNotification>> =
            sqlx::query_scalar("SELECT body FROM doctor_notifications ORDER BY created_at ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(n)| n).collect())
    }

    async fn mark_read(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE doctor_notifications SET body = jsonb_set(body, '{read}', 'true') WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
