//! Input validation used by the sign-in flows before any provider round-trip.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Minimum password length accepted by the provider.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_password(password: &SecretString) -> bool {
    password.expose_secret().chars().count() >= MIN_PASSWORD_LENGTH
}
