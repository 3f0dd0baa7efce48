mod route_report_handler;

pub use route_report_handler::*;
