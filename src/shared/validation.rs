use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for report link tokens as issued: 32 random bytes, hex encoded
    /// - Valid: 64 characters of 0-9, a-f (either case)
    /// - Invalid: empty, shorter/longer, non-hex characters
    pub static ref REPORT_TOKEN_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{64}$").unwrap();
}

/// Returns true when `token` has the shape of an issued report link token
pub fn is_well_formed_token(token: &str) -> bool {
    REPORT_TOKEN_REGEX.is_match(token)
}

/// Returns true when an optional text field is missing or whitespace only
pub fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}
