use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Route status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "route_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Completed,
    PartiallyCompleted,
    NotCompleted,
}

impl std::fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteStatus::Completed => write!(f, "COMPLETED"),
            RouteStatus::PartiallyCompleted => write!(f, "PARTIALLY_COMPLETED"),
            RouteStatus::NotCompleted => write!(f, "NOT_COMPLETED"),
        }
    }
}

/// Database model for a daily route report
#[derive(Debug, Clone, FromRow)]
pub struct RouteReport {
    pub id: Uuid,
    pub link_id: Uuid,
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub report_date: NaiveDate,
    pub route_status: RouteStatus,
    pub delay_minutes: i32,
    pub delay_reason: Option<String>,
    pub kilometers_driven: Option<i32>,
    pub incident_description: Option<String>,
    pub notes: Option<String>,
    pub editable_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The driver-supplied fields of a report; an edit replaces all of them
#[derive(Debug, Clone, PartialEq)]
pub struct RouteReportContent {
    pub report_date: NaiveDate,
    pub route_status: RouteStatus,
    pub delay_minutes: i32,
    pub delay_reason: Option<String>,
    pub kilometers_driven: Option<i32>,
    pub incident_description: Option<String>,
    pub notes: Option<String>,
}

/// Data for creating a report while consuming its link
#[derive(Debug, Clone)]
pub struct CreateRouteReport {
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub content: RouteReportContent,
    pub created_at: DateTime<Utc>,
    pub editable_until: DateTime<Utc>,
}

impl RouteReport {
    /// Edits are accepted strictly before `editable_until`
    pub fn is_editable_at(&self, now: DateTime<Utc>) -> bool {
        now < self.editable_until
    }
}
