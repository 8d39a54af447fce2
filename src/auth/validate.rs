use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Validate a requester name: at least 2 characters after trimming,
/// letters and spaces only.
pub fn validate_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 || !trimmed.chars().all(|c| c.is_alphabetic() || c.is_whitespace()) {
        return Some("Please enter a valid name (letters and spaces only, at least 2 characters).".to_string());
    }
    None
}

/// Validate an email: `local@domain.tld` with no whitespace and a single `@`.
pub fn validate_email(email: &str) -> Option<String> {
    if !EMAIL_RE.is_match(email.trim()) {
        return Some("Please enter a valid email address.".to_string());
    }
    None
}

/// Trimmed, lower-cased email, the form it is stored in.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a required text field (no length cap).
pub fn validate_required(value: &str, field_name: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{field_name} is required"));
    }
    None
}
