//! Persistence boundary for report links and route reports.
//!
//! Services talk to the relational store only through [`ReportStore`]. The
//! store owns the two atomic primitives the link protocol relies on:
//! consuming a link together with creating its report, and updating a report
//! only while its edit window is still open.

mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::report_links::models::{CreateReportLink, ReportLink};
use crate::features::route_reports::models::{
    CreateRouteReport, RouteReport, RouteReportContent,
};

pub use postgres::PgReportStore;

/// Outcome of [`ReportStore::consume_link_and_create_report`]
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// The link was unused and unexpired; it is now consumed and the report exists
    Created(RouteReport),
    /// The conditional update matched nothing; nothing was written
    LinkUnavailable,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert_link(&self, data: &CreateReportLink) -> Result<ReportLink>;

    async fn find_link(&self, id: Uuid) -> Result<Option<ReportLink>>;

    async fn find_link_by_hash(&self, hashed_token: &str) -> Result<Option<ReportLink>>;

    /// In one transaction: set `used_at = data.created_at` on the link if it is
    /// still unused and unexpired at that instant, and insert the report.
    async fn consume_link_and_create_report(
        &self,
        link_id: Uuid,
        data: &CreateRouteReport,
    ) -> Result<ConsumeOutcome>;

    /// Loads a report together with the token digest of the link that created it
    async fn find_report_with_link_hash(
        &self,
        report_id: Uuid,
    ) -> Result<Option<(RouteReport, String)>>;

    /// Replaces the report content if `now < editable_until`; `None` otherwise
    async fn update_report_within_window(
        &self,
        report_id: Uuid,
        content: &RouteReportContent,
        now: DateTime<Utc>,
    ) -> Result<Option<RouteReport>>;
}
