//! Daily route reports submitted through report links.
//!
//! Submitting consumes the link in the same transaction that stores the
//! report. The driver may then correct the report until its edit window
//! closes, authorized by the same token.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/public/report-links/{token}/reports` | Link token | Submit a report |
//! | PATCH | `/api/public/reports/{id}` | Link token | Edit within the window |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::SubmissionService;
