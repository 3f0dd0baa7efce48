use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::report_links::models::{CreateReportLink, ReportLink};
use crate::features::route_reports::models::{
    CreateRouteReport, RouteReport, RouteReportContent,
};
use crate::modules::store::{ConsumeOutcome, ReportStore};

#[derive(FromRow)]
struct ReportWithLinkHash {
    #[sqlx(flatten)]
    report: RouteReport,
    hashed_token: String,
}

/// PostgreSQL implementation of [`ReportStore`]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert_link(&self, data: &CreateReportLink) -> Result<ReportLink> {
        let link = sqlx::query_as::<_, ReportLink>(
            r#"
            INSERT INTO report_links (id, driver_id, company_id, hashed_token, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, driver_id, company_id, hashed_token, expires_at, used_at, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.driver_id)
        .bind(data.company_id)
        .bind(&data.hashed_token)
        .bind(data.expires_at)
        .bind(data.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report link: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(link)
    }

    async fn find_link(&self, id: Uuid) -> Result<Option<ReportLink>> {
        let link = sqlx::query_as::<_, ReportLink>(
            r#"
            SELECT id, driver_id, company_id, hashed_token, expires_at, used_at, created_at
            FROM report_links
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load report link {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(link)
    }

    async fn find_link_by_hash(&self, hashed_token: &str) -> Result<Option<ReportLink>> {
        let link = sqlx::query_as::<_, ReportLink>(
            r#"
            SELECT id, driver_id, company_id, hashed_token, expires_at, used_at, created_at
            FROM report_links
            WHERE hashed_token = $1
            "#,
        )
        .bind(hashed_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up report link: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(link)
    }

    async fn consume_link_and_create_report(
        &self,
        link_id: Uuid,
        data: &CreateRouteReport,
    ) -> Result<ConsumeOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent submissions; the loser re-evaluates
        // the predicate after the winner commits and matches zero rows.
        let consumed = sqlx::query(
            r#"
            UPDATE report_links
            SET used_at = $2
            WHERE id = $1 AND used_at IS NULL AND expires_at > $2
            "#,
        )
        .bind(link_id)
        .bind(data.created_at)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(ConsumeOutcome::LinkUnavailable);
        }

        let content = &data.content;
        let report = sqlx::query_as::<_, RouteReport>(
            r#"
            INSERT INTO route_reports (
                id, link_id, driver_id, company_id,
                report_date, route_status, delay_minutes, delay_reason,
                kilometers_driven, incident_description, notes,
                editable_until, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING
                id, link_id, driver_id, company_id,
                report_date, route_status, delay_minutes, delay_reason,
                kilometers_driven, incident_description, notes,
                editable_until, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(link_id)
        .bind(data.driver_id)
        .bind(data.company_id)
        .bind(content.report_date)
        .bind(content.route_status)
        .bind(content.delay_minutes)
        .bind(&content.delay_reason)
        .bind(content.kilometers_driven)
        .bind(&content.incident_description)
        .bind(&content.notes)
        .bind(data.editable_until)
        .bind(data.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create route report: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        Ok(ConsumeOutcome::Created(report))
    }

    async fn find_report_with_link_hash(
        &self,
        report_id: Uuid,
    ) -> Result<Option<(RouteReport, String)>> {
        let row = sqlx::query_as::<_, ReportWithLinkHash>(
            r#"
            SELECT
                r.id, r.link_id, r.driver_id, r.company_id,
                r.report_date, r.route_status, r.delay_minutes, r.delay_reason,
                r.kilometers_driven, r.incident_description, r.notes,
                r.editable_until, r.created_at, r.updated_at,
                l.hashed_token
            FROM route_reports r
            JOIN report_links l ON l.id = r.link_id
            WHERE r.id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load route report {}: {:?}", report_id, e);
            AppError::Database(e)
        })?;

        Ok(row.map(|r| (r.report, r.hashed_token)))
    }

    async fn update_report_within_window(
        &self,
        report_id: Uuid,
        content: &RouteReportContent,
        now: DateTime<Utc>,
    ) -> Result<Option<RouteReport>> {
        let report = sqlx::query_as::<_, RouteReport>(
            r#"
            UPDATE route_reports
            SET report_date = $2, route_status = $3, delay_minutes = $4, delay_reason = $5,
                kilometers_driven = $6, incident_description = $7, notes = $8,
                updated_at = $9
            WHERE id = $1 AND editable_until > $9
            RETURNING
                id, link_id, driver_id, company_id,
                report_date, route_status, delay_minutes, delay_reason,
                kilometers_driven, incident_description, notes,
                editable_until, created_at, updated_at
            "#,
        )
        .bind(report_id)
        .bind(content.report_date)
        .bind(content.route_status)
        .bind(content.delay_minutes)
        .bind(&content.delay_reason)
        .bind(content.kilometers_driven)
        .bind(&content.incident_description)
        .bind(&content.notes)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update route report {}: {:?}", report_id, e);
            AppError::Database(e)
        })?;

        Ok(report)
    }
}
