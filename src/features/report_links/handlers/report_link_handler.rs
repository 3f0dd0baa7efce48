use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::report_links::dtos::{
    IssueReportLinkDto, IssuedReportLinkDto, ValidReportLinkDto,
};
use crate::features::report_links::services::ReportLinkService;
use crate::shared::types::ApiResponse;

/// Check whether a report link can still be used
///
/// Public endpoint opened from the link the driver received. Does not consume
/// the link.
#[utoipa::path(
    get,
    path = "/api/public/report-links/{token}",
    params(
        ("token" = String, Path, description = "Plaintext report link token")
    ),
    responses(
        (status = 200, description = "Link is valid", body = ApiResponse<ValidReportLinkDto>),
        (status = 404, description = "Link not found (LINK_NOT_FOUND)"),
        (status = 409, description = "Link already used (LINK_ALREADY_USED)"),
        (status = 410, description = "Link expired (LINK_EXPIRED)")
    ),
    tag = "report-links"
)]
pub async fn validate_report_link(
    State(service): State<Arc<ReportLinkService>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<ValidReportLinkDto>>> {
    let link = service.validate(&token).await?;
    Ok(Json(ApiResponse::success(
        Some(ValidReportLinkDto::from(link)),
        None,
        None,
    )))
}

/// Issue a single-use report link for a driver
///
/// Requires the issuer key as a bearer token. The plaintext token is only
/// returned in this response.
#[utoipa::path(
    post,
    path = "/api/report-links",
    request_body = IssueReportLinkDto,
    responses(
        (status = 201, description = "Link issued", body = ApiResponse<IssuedReportLinkDto>),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Missing or invalid issuer key")
    ),
    security(("issuer_key" = [])),
    tag = "report-links"
)]
pub async fn issue_report_link(
    State(service): State<Arc<ReportLinkService>>,
    AppJson(dto): AppJson<IssueReportLinkDto>,
) -> Result<(StatusCode, Json<ApiResponse<IssuedReportLinkDto>>)> {
    let issued = service.issue(dto.driver_id, dto.company_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(issued),
            Some("Report link issued".to_string()),
            None,
        )),
    ))
}
