mod report_link_handler;

pub use report_link_handler::*;
