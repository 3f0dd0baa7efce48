use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::features::route_reports::models::{RouteReport, RouteReportContent, RouteStatus};
use crate::shared::constants::{MAX_DELAY_MINUTES, MAX_KILOMETERS_PER_DAY, MAX_REPORT_TEXT_LENGTH};
use crate::shared::validation::is_blank;

/// Request DTO for the driver's daily route report form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteReportFormDto {
    /// Day the route was driven; must not be in the future
    pub report_date: NaiveDate,

    pub route_status: RouteStatus,

    /// Minutes behind schedule; a reason is required when greater than zero
    #[serde(default)]
    #[validate(range(min = 0, max = MAX_DELAY_MINUTES, message = "Delay must be between 0 and 1440 minutes"))]
    pub delay_minutes: i32,

    #[validate(length(max = MAX_REPORT_TEXT_LENGTH, message = "Delay reason must not exceed 2000 characters"))]
    pub delay_reason: Option<String>,

    #[validate(range(min = 0, max = MAX_KILOMETERS_PER_DAY, message = "Kilometers driven must be between 0 and 5000"))]
    pub kilometers_driven: Option<i32>,

    #[validate(length(max = MAX_REPORT_TEXT_LENGTH, message = "Incident description must not exceed 2000 characters"))]
    pub incident_description: Option<String>,

    #[validate(length(max = MAX_REPORT_TEXT_LENGTH, message = "Notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl RouteReportFormDto {
    /// Runs field validation plus the cross-field acceptance rules.
    ///
    /// `today` is the server's current UTC date.
    pub fn check(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };

        if self.delay_minutes > 0 && is_blank(self.delay_reason.as_deref()) {
            errors.add(
                "delay_reason",
                ValidationError::new("required")
                    .with_message("Delay reason is required when the route was delayed".into()),
            );
        }

        if self.route_status == RouteStatus::PartiallyCompleted && !self.has_description() {
            errors.add(
                "route_status",
                ValidationError::new("description_required").with_message(
                    "A partially completed route needs a delay reason, incident description or notes"
                        .into(),
                ),
            );
        }

        if self.report_date > today {
            errors.add(
                "report_date",
                ValidationError::new("future_date")
                    .with_message("Report date cannot be in the future".into()),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn has_description(&self) -> bool {
        !is_blank(self.delay_reason.as_deref())
            || !is_blank(self.incident_description.as_deref())
            || !is_blank(self.notes.as_deref())
    }

    /// Converts to stored content; blank text fields are stored as null
    pub fn into_content(self) -> RouteReportContent {
        fn normalize(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        RouteReportContent {
            report_date: self.report_date,
            route_status: self.route_status,
            delay_minutes: self.delay_minutes,
            delay_reason: normalize(self.delay_reason),
            kilometers_driven: self.kilometers_driven,
            incident_description: normalize(self.incident_description),
            notes: normalize(self.notes),
        }
    }
}

/// Request DTO for editing a report. The token may come here or in the
/// `X-Report-Token` header.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditRouteReportDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub report: RouteReportFormDto,
}

/// Response DTO for a successful submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedReportDto {
    pub report_id: Uuid,
    pub editable_until: DateTime<Utc>,
    /// Server-computed remaining edit time; clients schedule their timer from this
    pub editable_for_seconds: i64,
}

/// Response DTO for route report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteReportResponseDto {
    pub id: Uuid,
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

impl From<RouteReport> for RouteReportResponseDto {
    fn from(r: RouteReport) -> Self {
        Self {
            id: r.id,
            driver_id: r.driver_id,
            company_id: r.company_id,
            report_date: r.report_date,
            route_status: r.route_status,
            delay_minutes: r.delay_minutes,
            delay_reason: r.delay_reason,
            kilometers_driven: r.kilometers_driven,
            incident_description: r.incident_description,
            notes: r.notes,
            editable_until: r.editable_until,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Response DTO for an accepted edit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditedReportDto {
    #[serde(flatten)]
    pub report: RouteReportResponseDto,
    pub editable_for_seconds: i64,
}
