use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};

use crate::features::report_links::{routes as report_links_routes, ReportLinkService};
use crate::features::route_reports::{routes as route_reports_routes, SubmissionService};

/// Services shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<ReportLinkService>,
    pub submissions: Arc<SubmissionService>,
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Builds the API router without swagger or tower layers.
///
/// The issuance route is only mounted when an issuer key is configured.
pub fn build_router(state: &AppState, issuer_key: Option<&str>) -> Router {
    let mut router = Router::new()
        .merge(report_links_routes::public_routes(Arc::clone(&state.links)))
        .merge(route_reports_routes::routes(Arc::clone(&state.submissions)))
        .route("/health", get(health_check));

    match issuer_key {
        Some(key) => {
            router = router.merge(report_links_routes::issuer_routes(
                Arc::clone(&state.links),
                Arc::new(key.to_string()),
            ));
        }
        None => tracing::info!("Report link issuance disabled (no issuer key configured)"),
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderName, HeaderValue};
    use axum_test::TestServer;
    use chrono::Duration;
    use serde_json::{json, Value};

    use crate::shared::test_helpers::{t0, test_services, TestServices};

    const ISSUER_KEY: &str = "issuer-test-key";

    fn server() -> (TestServer, TestServices) {
        let s = test_services();
        let state = AppState {
            links: Arc::clone(&s.links),
            submissions: Arc::clone(&s.submissions),
        };
        let server = TestServer::new(build_router(&state, Some(ISSUER_KEY))).unwrap();
        (server, s)
    }

    fn bearer(key: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", key)).unwrap()
    }

    fn report_token(token: &str) -> HeaderValue {
        HeaderValue::from_str(token).unwrap()
    }

    fn x_report_token() -> HeaderName {
        HeaderName::from_static("x-report-token")
    }

    fn report_body() -> Value {
        json!({
            "reportDate": "2026-03-02",
            "routeStatus": "COMPLETED",
            "delayMinutes": 0,
            "kilometersDriven": 184,
            "notes": "All stops served"
        })
    }

    async fn issue(server: &TestServer) -> (String, String) {
        let response = server
            .post("/api/report-links")
            .add_header(header::AUTHORIZATION, bearer(ISSUER_KEY))
            .json(&json!({
                "driverId": uuid::Uuid::new_v4(),
                "companyId": uuid::Uuid::new_v4()
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["linkId"].as_str().unwrap().to_string(),
        )
    }

    async fn submit(server: &TestServer, token: &str, body: Value) -> axum_test::TestResponse {
        server
            .post(&format!("/api/public/report-links/{}/reports", token))
            .json(&body)
            .await
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _) = server();
        server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_issue_requires_issuer_key() {
        let (server, _) = server();
        let body = json!({
            "driverId": uuid::Uuid::new_v4(),
            "companyId": uuid::Uuid::new_v4()
        });

        server
            .post("/api/report-links")
            .json(&body)
            .await
            .assert_status_unauthorized();
        server
            .post("/api/report-links")
            .add_header(header::AUTHORIZATION, bearer("wrong-key"))
            .json(&body)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn test_issue_route_absent_without_key() {
        let s = test_services();
        let state = AppState {
            links: Arc::clone(&s.links),
            submissions: Arc::clone(&s.submissions),
        };
        let server = TestServer::new(build_router(&state, None)).unwrap();

        server
            .post("/api/report-links")
            .add_header(header::AUTHORIZATION, bearer(ISSUER_KEY))
            .json(&json!({
                "driverId": uuid::Uuid::new_v4(),
                "companyId": uuid::Uuid::new_v4()
            }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_validate_link_statuses() {
        let (server, s) = server();
        let (token, link_id) = issue(&server).await;

        let response = server
            .get(&format!("/api/public/report-links/{}", token))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["linkId"], link_id.as_str());

        let unknown = server
            .get(&format!("/api/public/report-links/{}", "0".repeat(64)))
            .await;
        unknown.assert_status_not_found();
        assert_eq!(unknown.json::<Value>()["code"], "LINK_NOT_FOUND");

        s.clock.advance(Duration::hours(24));
        let expired = server
            .get(&format!("/api/public/report-links/{}", token))
            .await;
        expired.assert_status(StatusCode::GONE);
        assert_eq!(expired.json::<Value>()["code"], "LINK_EXPIRED");
    }

    #[tokio::test]
    async fn test_submit_then_edit_within_window() {
        let (server, s) = server();
        let (token, _) = issue(&server).await;

        let response = submit(&server, &token, report_body()).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let report_id = body["data"]["reportId"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["editableForSeconds"], 600);
        let editable_until: chrono::DateTime<chrono::Utc> =
            serde_json::from_value(body["data"]["editableUntil"].clone()).unwrap();
        assert_eq!(editable_until, t0() + Duration::minutes(10));

        let used = server
            .get(&format!("/api/public/report-links/{}", token))
            .await;
        used.assert_status(StatusCode::CONFLICT);
        assert_eq!(used.json::<Value>()["code"], "LINK_ALREADY_USED");

        s.clock.advance(Duration::minutes(9));
        let mut edit = report_body();
        edit["kilometersDriven"] = json!(190);
        let edited = server
            .patch(&format!("/api/public/reports/{}", report_id))
            .add_header(x_report_token(), report_token(&token))
            .json(&edit)
            .await;
        edited.assert_status_ok();
        let edited: Value = edited.json();
        assert_eq!(edited["data"]["kilometersDriven"], 190);
        assert_eq!(edited["data"]["editableForSeconds"], 60);
    }

    #[tokio::test]
    async fn test_edit_after_window_is_rejected() {
        let (server, s) = server();
        let (token, _) = issue(&server).await;
        let body: Value = submit(&server, &token, report_body()).await.json();
        let report_id = body["data"]["reportId"].as_str().unwrap().to_string();

        s.clock.advance(Duration::minutes(11));
        let response = server
            .patch(&format!("/api/public/reports/{}", report_id))
            .add_header(x_report_token(), report_token(&token))
            .json(&report_body())
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["code"], "EDIT_WINDOW_CLOSED");
    }

    #[tokio::test]
    async fn test_edit_token_in_body() {
        let (server, _) = server();
        let (token, _) = issue(&server).await;
        let body: Value = submit(&server, &token, report_body()).await.json();
        let report_id = body["data"]["reportId"].as_str().unwrap().to_string();

        let mut edit = report_body();
        edit["token"] = json!(format!(" {}\n", token));
        server
            .patch(&format!("/api/public/reports/{}", report_id))
            .json(&edit)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_edit_with_other_token_is_forbidden() {
        let (server, _) = server();
        let (token, _) = issue(&server).await;
        let (other, _) = issue(&server).await;
        let body: Value = submit(&server, &token, report_body()).await.json();
        let report_id = body["data"]["reportId"].as_str().unwrap().to_string();

        let response = server
            .patch(&format!("/api/public/reports/{}", report_id))
            .add_header(x_report_token(), report_token(&other))
            .json(&report_body())
            .await;

        response.assert_status_forbidden();
        assert_eq!(response.json::<Value>()["code"], "TOKEN_MISMATCH");
    }

    #[tokio::test]
    async fn test_delay_without_reason_is_rejected() {
        let (server, s) = server();
        let (token, _) = issue(&server).await;
        let mut body = report_body();
        body["delayMinutes"] = json!(15);

        let response = submit(&server, &token, body).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        let errors = body["errors"].as_array().unwrap();
        assert!(errors
            .iter()
            .any(|e| e.as_str().unwrap().starts_with("delayReason")));
        assert_eq!(s.store.report_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_completion_without_description_is_rejected() {
        let (server, _) = server();
        let (token, _) = issue(&server).await;
        let mut body = report_body();
        body["routeStatus"] = json!("PARTIALLY_COMPLETED");
        body["notes"] = Value::Null;

        let response = submit(&server, &token, body).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert!(errors
            .iter()
            .any(|e| e.as_str().unwrap().starts_with("routeStatus")));

        // The rejected attempt leaves the link usable
        submit(&server, &token, report_body())
            .await
            .assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_second_submit_conflicts() {
        let (server, _) = server();
        let (token, _) = issue(&server).await;

        submit(&server, &token, report_body())
            .await
            .assert_status(StatusCode::CREATED);
        let response = submit(&server, &token, report_body()).await;

        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["code"], "LINK_ALREADY_USED");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (server, _) = server();
        let (token, _) = issue(&server).await;

        let response = submit(&server, &token, json!({ "routeStatus": "FLYING" })).await;

        response.assert_status_bad_request();
    }
}
