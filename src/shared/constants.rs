/// Number of random bytes in a report link token (64 hex chars)
pub const REPORT_TOKEN_BYTES: usize = 32;

/// Default validity window of a freshly issued report link
pub const DEFAULT_LINK_TTL_HOURS: i64 = 24;

/// Default time after submission during which a report may be edited
pub const DEFAULT_EDIT_WINDOW_MINUTES: i64 = 10;

/// Header carrying the plaintext link token on report edits
pub const REPORT_TOKEN_HEADER: &str = "x-report-token";

/// Key prefix for client-side session storage entries
pub const DEFAULT_SESSION_NAMESPACE: &str = "fleetReportLink";

/// Longest accepted free-text field on a route report
pub const MAX_REPORT_TEXT_LENGTH: u64 = 2000;

/// Delays longer than a full day are rejected as data entry errors
pub const MAX_DELAY_MINUTES: i32 = 24 * 60;

pub const MAX_KILOMETERS_PER_DAY: i32 = 5000;
