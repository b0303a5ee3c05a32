//! Signup and login field checks

use regex::Regex;
use std::sync::OnceLock;

use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 8;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z ]+$").expect("valid name regex"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,4}$").expect("valid email regex")
    })
}

/// Letters and spaces only
pub fn validate_name(name: &str) -> Result<(), AuthError> {
    if name_re().is_match(name) {
        Ok(())
    } else {
        Err(AuthError::InvalidName)
    }
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email_re().is_match(email) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(AuthError::PasswordTooShort)
    } else {
        Ok(())
    }
}

/// Emails are stored and looked up lowercased
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}
