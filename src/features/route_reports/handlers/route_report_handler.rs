use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::route_reports::dtos::{
    EditRouteReportDto, EditedReportDto, RouteReportFormDto, RouteReportResponseDto,
    SubmittedReportDto,
};
use crate::features::route_reports::services::SubmissionService;
use crate::shared::constants::REPORT_TOKEN_HEADER;
use crate::shared::types::ApiResponse;

/// Submit the daily route report through a report link
///
/// Consumes the link. The report stays editable for the returned number of
/// seconds.
#[utoipa::path(
    post,
    path = "/api/public/report-links/{token}/reports",
    params(
        ("token" = String, Path, description = "Plaintext report link token")
    ),
    request_body = RouteReportFormDto,
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<SubmittedReportDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Link not found (LINK_NOT_FOUND)"),
        (status = 409, description = "Link already used (LINK_ALREADY_USED)"),
        (status = 410, description = "Link expired (LINK_EXPIRED)")
    ),
    tag = "route-reports"
)]
pub async fn submit_report(
    State(service): State<Arc<SubmissionService>>,
    Path(token): Path<String>,
    AppJson(dto): AppJson<RouteReportFormDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmittedReportDto>>)> {
    let submitted = service.submit(&token, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(SubmittedReportDto {
                report_id: submitted.report.id,
                editable_until: submitted.report.editable_until,
                editable_for_seconds: submitted.editable_for.num_seconds(),
            }),
            Some("Report submitted".to_string()),
            None,
        )),
    ))
}

/// Edit a submitted report while its edit window is open
///
/// The original link token is sent in the `X-Report-Token` header or as
/// `token` in the body. The header wins when both are present.
#[utoipa::path(
    patch,
    path = "/api/public/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID"),
        ("X-Report-Token" = Option<String>, Header, description = "Report link token")
    ),
    request_body = EditRouteReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<EditedReportDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Token does not match (TOKEN_MISMATCH)"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Edit window closed (EDIT_WINDOW_CLOSED)")
    ),
    tag = "route-reports"
)]
pub async fn edit_report(
    State(service): State<Arc<SubmissionService>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    AppJson(dto): AppJson<EditRouteReportDto>,
) -> Result<Json<ApiResponse<EditedReportDto>>> {
    let token = edit_token(&headers, dto.token.as_deref());

    let edited = service.edit(id, token.as_deref(), dto.report).await?;
    Ok(Json(ApiResponse::success(
        Some(EditedReportDto {
            editable_for_seconds: edited.editable_for.num_seconds(),
            report: RouteReportResponseDto::from(edited.report),
        }),
        Some("Report updated".to_string()),
        None,
    )))
}

/// Picks the edit token from the header, falling back to the body; both trimmed
fn edit_token(headers: &HeaderMap, body_token: Option<&str>) -> Option<String> {
    headers
        .get(REPORT_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .or(body_token)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
