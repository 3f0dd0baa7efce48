//! Single-use report links sent to drivers.
//!
//! A link carries a random token; only its peppered SHA-256 digest is stored.
//! Links expire after a configurable lifetime and are consumed by the first
//! accepted report.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/public/report-links/{token}` | No | Check a link |
//! | POST | `/api/report-links` | Issuer key | Issue a link for a driver |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ReportLinkService;
