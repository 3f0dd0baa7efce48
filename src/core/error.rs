use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    InvalidFields(ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Report link not found")]
    LinkNotFound,

    #[error("Report link expired")]
    LinkExpired,

    #[error("Report link already used")]
    LinkAlreadyUsed,

    #[error("Edit window closed")]
    EditWindowClosed,

    #[error("Edit token does not match report")]
    TokenMismatch,
}

impl AppError {
    /// Stable machine-readable error kind, sent as `code` in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidFields(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::LinkNotFound => "LINK_NOT_FOUND",
            AppError::LinkExpired => "LINK_EXPIRED",
            AppError::LinkAlreadyUsed => "LINK_ALREADY_USED",
            AppError::EditWindowClosed => "EDIT_WINDOW_CLOSED",
            AppError::TokenMismatch => "TOKEN_MISMATCH",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) | AppError::LinkNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidFields(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TokenMismatch => StatusCode::FORBIDDEN,
            AppError::LinkAlreadyUsed | AppError::EditWindowClosed => StatusCode::CONFLICT,
            AppError::LinkExpired => StatusCode::GONE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let (message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::NotFound(ref msg) => (msg.clone(), None),
            AppError::InvalidFields(ref errs) => (
                "Report contains invalid fields".to_string(),
                Some(field_error_messages(errs)),
            ),
            AppError::BadRequest(ref msg) => (msg.clone(), None),
            AppError::Unauthorized(ref msg) => (msg.clone(), None),
            AppError::LinkNotFound => (
                "This report link is invalid. Ask your dispatcher for a new link.".to_string(),
                None,
            ),
            AppError::LinkExpired => (
                "This report link has expired. Ask your dispatcher for a new link.".to_string(),
                None,
            ),
            AppError::LinkAlreadyUsed => (
                "A report has already been submitted with this link.".to_string(),
                None,
            ),
            AppError::EditWindowClosed => (
                "The edit window for this report has closed.".to_string(),
                None,
            ),
            AppError::TokenMismatch => ("Cannot verify edit permission.".to_string(), None),
        };

        let body = Json(ApiResponse::<()>::error_with_code(
            Some(message),
            Some(code.to_string()),
            errors,
        ));

        (status, body).into_response()
    }
}

/// Flattens field errors into `"fieldName: message"` strings with camelCase
/// field names, matching the JSON payload.
pub fn field_error_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(field_errors) = kind {
            for error in field_errors {
                let detail = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                messages.push(format!("{}: {}", to_camel_case(field), detail));
            }
        }
    }
    messages.sort();
    messages
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub type Result<T> = std::result::Result<T, AppError>;
