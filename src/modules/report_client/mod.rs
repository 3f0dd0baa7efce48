//! Client side of the report-link flow.
//!
//! Used by the driver-facing frontend host: a session-scoped replay guard, the
//! per-report edit window and an HTTP client for the public endpoints.

pub mod api_client;
pub mod edit_window;
pub mod replay_guard;
pub mod session_store;

pub use api_client::{ClientError, ReportLinkClient};
pub use edit_window::{EditWindow, EditWindowState, LockReason};
pub use replay_guard::ReplayGuard;
pub use session_store::{MemorySessionStore, SessionStore};
