//! Modules layer - Infrastructure components
//!
//! Contains the report store adapters and the report-link client.

pub mod report_client;
pub mod store;
