use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::core::config::ReportLinkConfig;
use crate::core::error::{AppError, Result};
use crate::features::report_links::dtos::IssuedReportLinkDto;
use crate::features::report_links::models::{
    classify_link, CreateReportLink, LinkStatus, ReportLink,
};
use crate::features::report_links::services::token_hasher::{generate_token, TokenHasher};
use crate::modules::store::ReportStore;
use crate::shared::validation::is_well_formed_token;

/// Maps a non-valid classification onto the error the caller sees
pub fn link_status_error(status: LinkStatus) -> Option<AppError> {
    match status {
        LinkStatus::NotFound => Some(AppError::LinkNotFound),
        LinkStatus::Expired => Some(AppError::LinkExpired),
        LinkStatus::AlreadyUsed => Some(AppError::LinkAlreadyUsed),
        LinkStatus::Valid => None,
    }
}

/// Service for issuing and validating report links
pub struct ReportLinkService {
    store: Arc<dyn ReportStore>,
    clock: Arc<dyn Clock>,
    hasher: TokenHasher,
    link_ttl: Duration,
    frontend_url: String,
}

impl ReportLinkService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        clock: Arc<dyn Clock>,
        config: &ReportLinkConfig,
        frontend_url: &str,
    ) -> Self {
        Self {
            store,
            clock,
            hasher: TokenHasher::new(config.pepper.clone()),
            link_ttl: config.link_ttl,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn hasher(&self) -> &TokenHasher {
        &self.hasher
    }

    /// Checks a plaintext token against the store. Read-only.
    ///
    /// Malformed tokens are rejected as not found without touching the store.
    pub async fn validate(&self, token: &str) -> Result<ReportLink> {
        self.validate_at(token, self.clock.utc()).await
    }

    /// Same as [`validate`](Self::validate) with an explicit instant, so a
    /// submission classifies and consumes at one consistent `now`.
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<ReportLink> {
        if !is_well_formed_token(token) {
            tracing::debug!("Rejected malformed report link token");
            return Err(AppError::LinkNotFound);
        }

        let digest = self.hasher.hash(token);
        let link = self.store.find_link_by_hash(&digest).await?;

        let status = classify_link(link.as_ref(), now);
        match (link, link_status_error(status)) {
            (Some(link), None) => Ok(link),
            (link, Some(err)) => {
                tracing::info!(
                    "Report link rejected: link_id={:?}, status={:?}",
                    link.map(|l| l.id),
                    status
                );
                Err(err)
            }
            (None, None) => Err(AppError::LinkNotFound),
        }
    }

    /// Issues a new link for a driver. The plaintext token is returned once and
    /// only its digest is stored.
    pub async fn issue(&self, driver_id: Uuid, company_id: Uuid) -> Result<IssuedReportLinkDto> {
        let token = generate_token();
        let now = self.clock.utc();

        let link = self
            .store
            .insert_link(&CreateReportLink {
                driver_id,
                company_id,
                hashed_token: self.hasher.hash(&token),
                expires_at: now + self.link_ttl,
                created_at: now,
            })
            .await?;

        tracing::info!(
            "Report link issued: link_id={}, driver_id={}, company_id={}, expires_at={}",
            link.id,
            link.driver_id,
            link.company_id,
            link.expires_at
        );

        Ok(IssuedReportLinkDto {
            link_id: link.id,
            url: format!("{}/report/{}", self.frontend_url, token),
            token,
            expires_at: link.expires_at,
        })
    }
}
