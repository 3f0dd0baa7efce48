mod submission_service;

pub use submission_service::{EditableReport, SubmissionService};
