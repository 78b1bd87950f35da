use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Primary keys are random v4 UUIDs rendered as text.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time at the precision the store keeps, so values handed back
/// from a write compare equal to the same rows read later.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Epoch milliseconds, the persisted form of every timestamp column.
pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Emails are matched case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trims and drops blank strings, so `Some("  ")` counts as not supplied.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
