use crate::core::error::AppError;
use crate::features::report_links::services::token_hasher::constant_time_eq;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// MakeSpan that records the request id and never the raw URI.
///
/// Public paths carry report link tokens, so the span gets the path with any
/// token segment masked.
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %redact_path(request.uri().path()),
            request_id = %request_id,
        )
    }
}

/// Masks the token segment of `/api/public/report-links/{token}...`
pub fn redact_path(path: &str) -> String {
    const PREFIX: &str = "/api/public/report-links/";

    match path.strip_prefix(PREFIX) {
        Some(rest) => {
            let tail = rest.find('/').map(|i| &rest[i..]).unwrap_or("");
            format!("{}***{}", PREFIX, tail)
        }
        None => path.to_string(),
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok());

            if let Some(encoded) = auth_header.and_then(|h| h.strip_prefix("Basic ")) {
                if let Ok(decoded) = BASE64_STANDARD.decode(encoded) {
                    if constant_time_eq(&decoded, credentials.as_bytes()) {
                        return Ok(next.run(req).await);
                    }
                }
            }

            let mut response = (StatusCode::UNAUTHORIZED, Body::from("Unauthorized")).into_response();
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"Swagger UI\""),
            );

            Err(response)
        })
    }
}

/// Guards link issuance behind the configured issuer key (`Authorization: Bearer <key>`)
pub async fn issuer_key_middleware(
    State(issuer_key): State<Arc<String>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let key = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    if !constant_time_eq(key.trim().as_bytes(), issuer_key.as_bytes()) {
        tracing::warn!("Report link issuance rejected: invalid issuer key");
        return Err(AppError::Unauthorized("Invalid issuer key".to_string()));
    }

    Ok(next.run(req).await)
}
