mod report_link_service;
pub mod token_hasher;

pub use report_link_service::{link_status_error, ReportLinkService};
pub use token_hasher::{generate_token, hash_token, TokenHasher};
