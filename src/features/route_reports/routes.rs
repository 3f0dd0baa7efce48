use std::sync::Arc;

use axum::{
    routing::{patch, post},
    Router,
};

use crate::features::route_reports::handlers;
use crate::features::route_reports::services::SubmissionService;

/// Create routes for the route reports feature
///
/// Note: These routes are public; the report link token is the only credential.
pub fn routes(service: Arc<SubmissionService>) -> Router {
    Router::new()
        .route(
            "/api/public/report-links/{token}/reports",
            post(handlers::submit_report),
        )
        .route("/api/public/reports/{id}", patch(handlers::edit_report))
        .with_state(service)
}
