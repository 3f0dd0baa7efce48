mod route_report;

pub use route_report::{CreateRouteReport, RouteReport, RouteReportContent, RouteStatus};
