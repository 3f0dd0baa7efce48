pub mod report_links;
pub mod route_reports;
