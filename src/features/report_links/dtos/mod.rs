mod report_link_dto;

pub use report_link_dto::{IssueReportLinkDto, IssuedReportLinkDto, ValidReportLinkDto};
