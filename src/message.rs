//! User-displayable messages for authentication outcomes.
//!
//! Screens render these directly; localized catalogs can look a message up by
//! its stable [`UiMessage::key`], with the `Display` text as the English
//! fallback. Provider error objects are mapped to one of these at the gateway
//! boundary and never reach presentation code.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMessage {
    EmailAlreadyInUse,
    Network,
    RegistrationFailed,
    AccountMissingAfterRegistration,
    VerificationSendFailed,
    TooManyRequests,
    InvalidCredentials,
    SignInFailed,
    GoogleSignInCancelled,
    GoogleSignInFailed,
}

impl UiMessage {
    /// Stable lookup key for localization catalogs.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "email_already_in_use",
            Self::Network => "network_error",
            Self::RegistrationFailed => "registration_failed",
            Self::AccountMissingAfterRegistration => "account_missing_after_registration",
            Self::VerificationSendFailed => "verification_send_failed",
            Self::TooManyRequests => "too_many_requests",
            Self::InvalidCredentials => "invalid_credentials",
            Self::SignInFailed => "sign_in_failed",
            Self::GoogleSignInCancelled => "google_sign_in_cancelled",
            Self::GoogleSignInFailed => "google_sign_in_failed",
        }
    }

    const fn text(self) -> &'static str {
        match self {
            Self::EmailAlreadyInUse => "This email address is already in use",
            Self::Network => "A network error occurred, check your connection and try again",
            Self::RegistrationFailed => "Registration failed, please try again",
            Self::AccountMissingAfterRegistration => {
                "Your account was created but could not be loaded, try signing in"
            }
            Self::VerificationSendFailed => "The verification email could not be sent",
            Self::TooManyRequests => "Too many attempts, please wait a moment and try again",
            Self::InvalidCredentials => "Incorrect email or password",
            Self::SignInFailed => "Sign-in failed, please try again",
            Self::GoogleSignInCancelled => "Google sign-in was cancelled",
            Self::GoogleSignInFailed => "Google sign-in failed, please try again",
        }
    }
}

impl fmt::Display for UiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
