//! The authentication capability interface.
//!
//! Presentation code depends on [`AuthenticationGateway`] only; the concrete
//! adapter ([`crate::provider::ProviderGateway`]) and the in-memory
//! [`FakeAuthenticationGateway`] both implement it.

pub mod fake;
pub use fake::FakeAuthenticationGateway;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::result::AuthResult;

/// Immutable snapshot of the signed-in account.
///
/// Rebuilt fresh from the provider on every successful gateway call; nothing
/// here is cached across operations or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    /// Provider-assigned opaque identifier.
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

/// Profile display name built from its parts: both components trimmed,
/// joined with a single space.
#[must_use]
pub fn display_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
}

/// Operations against the external identity provider.
///
/// Field non-emptiness is the caller's responsibility (see
/// [`crate::validate`]). Implementations map every provider failure to a
/// [`crate::UiMessage`] and never retry on their own.
#[async_trait]
pub trait AuthenticationGateway: Send + Sync {
    /// Creates the account, then best-effort sets the profile display name to
    /// `"{first_name} {last_name}"`.
    async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthenticatedUser>;

    /// Password sign-in.
    async fn sign_in(&self, email: &str, password: &SecretString)
        -> AuthResult<AuthenticatedUser>;

    /// Exchanges a federated one-tap ID token for a provider session.
    async fn sign_in_with_google(&self, id_token: &str) -> AuthResult<AuthenticatedUser>;

    /// Triggers the provider's verification email for the current session.
    /// Fails without a network call when nobody is signed in.
    async fn request_email_verification(&self) -> AuthResult<bool>;

    /// Refreshes and returns the verification flag for the current session.
    ///
    /// Returns `false` without a network call when nobody is signed in, and
    /// `false` (logged) when the refresh itself fails.
    async fn is_current_user_verified(&self) -> bool;

    /// Snapshot of the locally held session, no provider round-trip.
    async fn current_user(&self) -> Option<AuthenticatedUser>;

    /// Drops the locally held session.
    async fn sign_out(&self);
}
