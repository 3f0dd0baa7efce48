use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::report_links::{dtos as report_links_dtos, handlers as report_links_handlers};
use crate::features::route_reports::{
    dtos as route_reports_dtos, handlers as route_reports_handlers, models as route_reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Report links (public + issuer)
        report_links_handlers::validate_report_link,
        report_links_handlers::issue_report_link,
        // Route reports (link token)
        route_reports_handlers::submit_report,
        route_reports_handlers::edit_report,
    ),
    components(
        schemas(
            Meta,
            ApiResponse<report_links_dtos::ValidReportLinkDto>,
            ApiResponse<report_links_dtos::IssuedReportLinkDto>,
            ApiResponse<route_reports_dtos::SubmittedReportDto>,
            ApiResponse<route_reports_dtos::EditedReportDto>,
            report_links_dtos::ValidReportLinkDto,
            report_links_dtos::IssueReportLinkDto,
            report_links_dtos::IssuedReportLinkDto,
            route_reports_models::RouteStatus,
            route_reports_dtos::RouteReportFormDto,
            route_reports_dtos::EditRouteReportDto,
            route_reports_dtos::SubmittedReportDto,
            route_reports_dtos::RouteReportResponseDto,
            route_reports_dtos::EditedReportDto,
        )
    ),
    tags(
        (name = "report-links", description = "Single-use report links"),
        (name = "route-reports", description = "Daily route reports submitted through a link"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Fleet Report Links API",
        version = "0.1.0",
        description = "Public report-link endpoints for fleet drivers",
    )
)]
pub struct ApiDoc;

/// Adds the issuer key bearer scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "issuer_key",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
