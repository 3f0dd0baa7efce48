mod route_report_dto;

pub use route_report_dto::{
    EditRouteReportDto, EditedReportDto, RouteReportFormDto, RouteReportResponseDto,
    SubmittedReportDto,
};
