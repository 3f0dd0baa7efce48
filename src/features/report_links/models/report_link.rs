use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a report link. Only the token digest is stored.
#[derive(Debug, Clone, FromRow)]
pub struct ReportLink {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub hashed_token: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a freshly issued link
#[derive(Debug, Clone)]
pub struct CreateReportLink {
    pub driver_id: Uuid,
    pub company_id: Uuid,
    pub hashed_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of classifying a link lookup at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    NotFound,
    Expired,
    AlreadyUsed,
    Valid,
}

impl ReportLink {
    /// Classifies this link at `now`.
    ///
    /// A consumed link stays `AlreadyUsed` after its expiry passes, so a
    /// driver who already submitted is told so rather than asked for a new link.
    pub fn status_at(&self, now: DateTime<Utc>) -> LinkStatus {
        if self.used_at.is_some() {
            LinkStatus::AlreadyUsed
        } else if now >= self.expires_at {
            LinkStatus::Expired
        } else {
            LinkStatus::Valid
        }
    }
}

/// Classifies an optional lookup result; a missing row is `NotFound`
pub fn classify_link(link: Option<&ReportLink>, now: DateTime<Utc>) -> LinkStatus {
    link.map(|l| l.status_at(now))
        .unwrap_or(LinkStatus::NotFound)
}
