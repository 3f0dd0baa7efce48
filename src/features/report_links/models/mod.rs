mod report_link;

pub use report_link::{classify_link, CreateReportLink, LinkStatus, ReportLink};
