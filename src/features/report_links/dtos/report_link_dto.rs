use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::report_links::models::ReportLink;

/// Response DTO for a link that can be used to submit a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidReportLinkDto {
    pub link_id: Uuid,
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<ReportLink> for ValidReportLinkDto {
    fn from(l: ReportLink) -> Self {
        Self {
            link_id: l.id,
            driver_id: l.driver_id,
            company_id: l.company_id,
            expires_at: l.expires_at,
        }
    }
}

/// Request DTO for issuing a report link to a driver
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueReportLinkDto {
    pub driver_id: Uuid,
    pub company_id: Uuid,
}

/// Response DTO for a newly issued link.
///
/// `token` and `url` are only ever returned here; the server keeps the digest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuedReportLinkDto {
    pub link_id: Uuid,
    pub token: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
