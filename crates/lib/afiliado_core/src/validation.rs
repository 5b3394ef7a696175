//! Input validation and sanitizing for user-entered text.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::messages;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
});

static DANGEROUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[<>]|javascript:|on\w+\s*=").unwrap_or_else(|e| panic!("sanitize regex: {e}"))
});

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

/// Validation failures. The display text is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", messages::REQUIRED_FIELD)]
    Required(&'static str),

    #[error("{}", messages::INVALID_EMAIL)]
    InvalidEmail,

    #[error("{}", messages::PASSWORD_MIN_LENGTH)]
    PasswordTooShort,

    #[error("{}", messages::NAME_MIN_LENGTH)]
    NameTooShort,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_url(raw: &str) -> bool {
    url::Url::parse(raw).is_ok()
}

/// Strips angle brackets, `javascript:` and inline `on*=` handlers, then trims.
pub fn sanitize_input(input: &str) -> String {
    DANGEROUS_RE.replace_all(input, "").trim().to_string()
}

/// Checks a registration form before it is sent.
///
/// Returns the first failing field, in form order.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required("name"));
    }
    if name.chars().count() < MIN_NAME_LEN {
        return Err(ValidationError::NameTooShort);
    }
    if email.trim().is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(ValidationError::Required("password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
