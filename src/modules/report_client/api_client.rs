use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use chrono::Duration;
use mockable::Clock;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::features::report_links::dtos::ValidReportLinkDto;
use crate::features::route_reports::dtos::{
    EditedReportDto, RouteReportFormDto, SubmittedReportDto,
};
use crate::modules::report_client::edit_window::{EditWindow, EditWindowState};
use crate::modules::report_client::replay_guard::ReplayGuard;
use crate::modules::report_client::session_store::SessionStore;
use crate::shared::constants::REPORT_TOKEN_HEADER;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("A report was already submitted with this link in this session")]
    AlreadySubmitted,

    #[error("No report link token is bound to report {0}")]
    UnknownReport(Uuid),

    #[error("The edit window for this report has closed")]
    EditWindowClosed,

    #[error("Server rejected request: HTTP {status} {code:?} {message:?}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// True when the server cannot have consumed the link: the form was
    /// rejected, the server failed, or the request never completed.
    pub fn is_retryable_submission(&self) -> bool {
        match self {
            ClientError::Rejected { status, .. } => {
                *status == StatusCode::BAD_REQUEST.as_u16() || *status >= 500
            }
            ClientError::Http(_) => true,
            _ => false,
        }
    }

    /// Stable error code from the server, if the server produced this error
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// HTTP client for the public report-link endpoints.
///
/// Keeps the session replay guard and one edit window per submitted report.
pub struct ReportLinkClient<S: SessionStore> {
    http_client: reqwest::Client,
    base_url: String,
    guard: ReplayGuard<S>,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<Uuid, EditWindow>>,
}

impl<S: SessionStore> ReportLinkClient<S> {
    pub fn new(base_url: &str, session: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            guard: ReplayGuard::new(session),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn guard(&self) -> &ReplayGuard<S> {
        &self.guard
    }

    fn windows(&self) -> MutexGuard<'_, HashMap<Uuid, EditWindow>> {
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current edit window state for a report submitted from this client
    pub fn window_state(&self, report_id: Uuid) -> Option<EditWindowState> {
        self.windows().get(&report_id).map(EditWindow::state)
    }

    pub fn subscribe_window(
        &self,
        report_id: Uuid,
    ) -> Option<tokio::sync::watch::Receiver<EditWindowState>> {
        self.windows().get(&report_id).map(EditWindow::subscribe)
    }

    pub async fn validate_link(&self, token: &str) -> ClientResult<ValidReportLinkDto> {
        let url = format!("{}/api/public/report-links/{}", self.base_url, token);
        let response = self.http_client.get(&url).send().await?;
        let (_, link) = read_response(response).await?;
        Ok(link)
    }

    /// Drops windows that have locked; their reports can no longer be edited
    fn evict_locked_windows(&self) {
        self.windows().retain(|_, window| window.is_editable());
    }

    /// Forgets every token, binding and edit window this session holds
    pub fn clear_all(&self) {
        self.guard.clear_all();
        self.windows().clear();
    }

    /// Submits a report. Refuses locally when this session already used the token.
    ///
    /// The used marker is released again when the link cannot have been
    /// consumed: a 400, a 5xx or a transport failure.
    pub async fn submit(
        &self,
        token: &str,
        form: &RouteReportFormDto,
    ) -> ClientResult<SubmittedReportDto> {
        if self.guard.is_used(token) {
            tracing::debug!("Submission refused locally: token already used in session");
            return Err(ClientError::AlreadySubmitted);
        }
        self.guard.mark_used(token, self.clock.utc());
        self.evict_locked_windows();

        let url = format!(
            "{}/api/public/report-links/{}/reports",
            self.base_url, token
        );
        let result = match self.http_client.post(&url).json(form).send().await {
            Ok(response) => read_response::<SubmittedReportDto>(response).await,
            Err(e) => Err(ClientError::Http(e)),
        };

        match result {
            Ok((_, submitted)) => {
                self.guard.associate(submitted.report_id, token);
                let window = EditWindow::open(
                    Duration::seconds(submitted.editable_for_seconds),
                    Arc::clone(&self.clock),
                );
                self.windows().insert(submitted.report_id, window);
                tracing::info!(
                    "Report submitted: report_id={}, editable_for_seconds={}",
                    submitted.report_id,
                    submitted.editable_for_seconds
                );
                Ok(submitted)
            }
            Err(err) => {
                if err.is_retryable_submission() {
                    self.guard.release(token);
                }
                Err(err)
            }
        }
    }

    /// Edits a report submitted from this session, using its bound token
    pub async fn edit(
        &self,
        report_id: Uuid,
        form: &RouteReportFormDto,
    ) -> ClientResult<EditedReportDto> {
        let token = self
            .guard
            .lookup_token(report_id)
            .ok_or(ClientError::UnknownReport(report_id))?;

        if let Some(state) = self.window_state(report_id) {
            if !state.is_editable() {
                return Err(ClientError::EditWindowClosed);
            }
        }

        let url = format!("{}/api/public/reports/{}", self.base_url, report_id);
        let response = self
            .http_client
            .patch(&url)
            .header(REPORT_TOKEN_HEADER, &token)
            .json(form)
            .send()
            .await?;

        let result = read_response::<EditedReportDto>(response).await;

        if let Some(window) = self.windows().get_mut(&report_id) {
            match &result {
                Ok((_, edited)) => {
                    window.reschedule(Duration::seconds(edited.editable_for_seconds));
                }
                Err(ClientError::Rejected { status, .. }) => {
                    if let Ok(status) = StatusCode::from_u16(*status) {
                        window.on_server_response(status);
                    }
                }
                Err(_) => {}
            }
        }

        result.map(|(_, edited)| edited)
    }
}

async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> ClientResult<(StatusCode, T)> {
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if !status.is_success() {
        let body = response
            .json::<ApiResponse<serde_json::Value>>()
            .await
            .ok();
        tracing::debug!("Report API rejected request: HTTP {}", status);
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            code: body.as_ref().and_then(|b| b.code.clone()),
            message: body.and_then(|b| b.message),
        });
    }

    let body = response.json::<ApiResponse<T>>().await?;
    match body.data {
        Some(data) => Ok((status, data)),
        None => Err(ClientError::Rejected {
            status: status.as_u16(),
            code: body.code,
            message: Some("Response contained no data".to_string()),
        }),
    }
}
