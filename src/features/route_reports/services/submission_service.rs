use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::report_links::models::classify_link;
use crate::features::report_links::services::{link_status_error, ReportLinkService};
use crate::features::route_reports::dtos::RouteReportFormDto;
use crate::features::route_reports::models::{CreateRouteReport, RouteReport};
use crate::modules::store::{ConsumeOutcome, ReportStore};
use crate::shared::validation::is_well_formed_token;

/// A stored report plus how long it stays editable from the server's view
#[derive(Debug, Clone)]
pub struct EditableReport {
    pub report: RouteReport,
    pub editable_for: Duration,
}

/// Service for submitting and editing route reports through report links
pub struct SubmissionService {
    store: Arc<dyn ReportStore>,
    links: Arc<ReportLinkService>,
    clock: Arc<dyn Clock>,
    edit_window: Duration,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        links: Arc<ReportLinkService>,
        clock: Arc<dyn Clock>,
        edit_window: Duration,
    ) -> Self {
        Self {
            store,
            links,
            clock,
            edit_window,
        }
    }

    /// Submit a report with a link token.
    ///
    /// The link is re-validated here, and consumed in the same store
    /// transaction that creates the report. A lost race surfaces as
    /// `LinkAlreadyUsed`.
    pub async fn submit(&self, token: &str, form: RouteReportFormDto) -> Result<EditableReport> {
        let now = self.clock.utc();
        let link = self.links.validate_at(token, now).await?;

        form.check(now.date_naive())
            .map_err(AppError::InvalidFields)?;

        let data = CreateRouteReport {
            driver_id: link.driver_id,
            company_id: link.company_id,
            content: form.into_content(),
            created_at: now,
            editable_until: now + self.edit_window,
        };

        match self
            .store
            .consume_link_and_create_report(link.id, &data)
            .await?
        {
            ConsumeOutcome::Created(report) => {
                tracing::info!(
                    "Route report submitted: report_id={}, link_id={}, driver_id={}, editable_until={}",
                    report.id,
                    link.id,
                    report.driver_id,
                    report.editable_until
                );
                Ok(EditableReport {
                    report,
                    editable_for: self.edit_window,
                })
            }
            ConsumeOutcome::LinkUnavailable => {
                let current = self.store.find_link(link.id).await?;
                let status = classify_link(current.as_ref(), now);
                tracing::info!(
                    "Report submission lost link race: link_id={}, status={:?}",
                    link.id,
                    status
                );
                Err(link_status_error(status).unwrap_or(AppError::LinkAlreadyUsed))
            }
        }
    }

    /// Replace a report's content, authorized only by the original link token.
    ///
    /// Token mismatch is checked before the window so a stranger never learns
    /// whether a report is still editable.
    pub async fn edit(
        &self,
        report_id: Uuid,
        token: Option<&str>,
        form: RouteReportFormDto,
    ) -> Result<EditableReport> {
        let now = self.clock.utc();
        let token = token
            .filter(|t| is_well_formed_token(t))
            .ok_or(AppError::TokenMismatch)?;

        let (report, hashed_token) = self
            .store
            .find_report_with_link_hash(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if !self.links.hasher().matches(token, &hashed_token) {
            tracing::warn!("Report edit rejected, token mismatch: report_id={}", report_id);
            return Err(AppError::TokenMismatch);
        }

        if !report.is_editable_at(now) {
            tracing::info!(
                "Report edit rejected, window closed: report_id={}, editable_until={}",
                report_id,
                report.editable_until
            );
            return Err(AppError::EditWindowClosed);
        }

        form.check(now.date_naive())
            .map_err(AppError::InvalidFields)?;

        let updated = self
            .store
            .update_report_within_window(report_id, &form.into_content(), now)
            .await?
            .ok_or(AppError::EditWindowClosed)?;

        tracing::info!("Route report edited: report_id={}", report_id);

        Ok(EditableReport {
            editable_for: updated.editable_until - now,
            report: updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use futures::future::join_all;

    use crate::core::error::AppError;
    use crate::features::report_links::services::token_hasher::generate_token;
    use crate::features::route_reports::models::RouteStatus;
    use crate::shared::test_helpers::{completed_form, t0, test_services};

    #[tokio::test]
    async fn test_submit_sets_edit_deadline() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();

        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();

        assert_eq!(submitted.report.editable_until, t0() + Duration::minutes(10));
        assert_eq!(submitted.editable_for, Duration::minutes(10));
        assert_eq!(submitted.report.created_at, t0());
        assert_eq!(s.store.link(issued.link_id).unwrap().used_at, Some(t0()));
    }

    #[tokio::test]
    async fn test_second_submit_is_already_used() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();

        s.submissions.submit(&issued.token, completed_form()).await.unwrap();
        let err = s
            .submissions
            .submit(&issued.token, completed_form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LinkAlreadyUsed));
        assert_eq!(s.store.report_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_submissions_exactly_one_wins() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let attempts = 16;

        let handles = (0..attempts).map(|_| {
            let submissions = Arc::clone(&s.submissions);
            let token = issued.token.clone();
            tokio::spawn(async move { submissions.submit(&token, completed_form()).await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let already_used = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::LinkAlreadyUsed)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(already_used, attempts - 1);
        assert_eq!(s.store.report_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_payload_does_not_consume_link() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let mut form = completed_form();
        form.delay_minutes = 15;
        form.delay_reason = None;

        let err = s.submissions.submit(&issued.token, form).await.unwrap_err();

        match err {
            AppError::InvalidFields(errors) => {
                assert!(errors.field_errors().contains_key("delay_reason"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(s.store.link(issued.link_id).unwrap().used_at.is_none());
        assert!(s.links.validate(&issued.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_on_expired_link() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        s.clock.advance(Duration::hours(24));

        let err = s
            .submissions
            .submit(&issued.token, completed_form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LinkExpired));
        assert_eq!(s.store.report_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_within_window() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();

        s.clock.advance(Duration::minutes(9));
        let mut form = completed_form();
        form.route_status = RouteStatus::PartiallyCompleted;
        form.incident_description = Some("Customer site closed".to_string());

        let edited = s
            .submissions
            .edit(submitted.report.id, Some(&issued.token), form)
            .await
            .unwrap();

        assert_eq!(edited.report.route_status, RouteStatus::PartiallyCompleted);
        assert_eq!(edited.editable_for, Duration::minutes(1));
        assert_eq!(edited.report.editable_until, submitted.report.editable_until);
    }

    #[tokio::test]
    async fn test_edit_at_deadline_is_rejected() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();

        s.clock.set(submitted.report.editable_until);
        let err = s
            .submissions
            .edit(submitted.report.id, Some(&issued.token), completed_form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EditWindowClosed));
    }

    #[tokio::test]
    async fn test_edit_with_wrong_or_missing_token() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let other = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();

        let wrong = generate_token();
        for token in [None, Some("garbage"), Some(wrong.as_str()), Some(other.token.as_str())] {
            let err = s
                .submissions
                .edit(submitted.report.id, token, completed_form())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::TokenMismatch), "token {:?}", token);
        }
    }

    #[tokio::test]
    async fn test_wrong_token_after_deadline_is_still_mismatch() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();
        s.clock.advance(Duration::hours(1));

        let err = s
            .submissions
            .edit(submitted.report.id, Some(&generate_token()), completed_form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TokenMismatch));
    }

    #[tokio::test]
    async fn test_edit_unknown_report() {
        let s = test_services();
        let err = s
            .submissions
            .edit(uuid::Uuid::now_v7(), Some(&generate_token()), completed_form())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_edit_validates_payload() {
        let s = test_services();
        let issued = s.links.issue(uuid::Uuid::new_v4(), uuid::Uuid::new_v4()).await.unwrap();
        let submitted = s.submissions.submit(&issued.token, completed_form()).await.unwrap();
        let mut form = completed_form();
        form.route_status = RouteStatus::PartiallyCompleted;
        form.notes = None;

        let err = s
            .submissions
            .edit(submitted.report.id, Some(&issued.token), form)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFields(_)));
    }
}
