use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::middleware;
use crate::features::report_links::handlers;
use crate::features::report_links::services::ReportLinkService;

/// Public routes, opened from the link the driver received
pub fn public_routes(service: Arc<ReportLinkService>) -> Router {
    Router::new()
        .route(
            "/api/public/report-links/{token}",
            get(handlers::validate_report_link),
        )
        .with_state(service)
}

/// Issuance routes, guarded by the issuer key
pub fn issuer_routes(service: Arc<ReportLinkService>, issuer_key: Arc<String>) -> Router {
    Router::new()
        .route("/api/report-links", post(handlers::issue_report_link))
        .route_layer(axum::middleware::from_fn_with_state(
            issuer_key,
            middleware::issuer_key_middleware,
        ))
        .with_state(service)
}
