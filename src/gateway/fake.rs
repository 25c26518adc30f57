//! In-memory gateway for tests and local development.
//!
//! Reproduces the gateway contract without any network: duplicate emails
//! collide, verification checks require a session, and Google sign-in only
//! accepts tokens issued through [`FakeAuthenticationGateway::issue_google_token`].

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::gateway::{display_name, AuthenticatedUser, AuthenticationGateway};
use crate::message::UiMessage;
use crate::result::AuthResult;

#[derive(Debug, Clone)]
struct FakeAccount {
    id: String,
    password: String,
    display_name: Option<String>,
    email_verified: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    accounts: HashMap<String, FakeAccount>,
    google_tokens: HashMap<String, String>,
    current: Option<String>,
    next_id: u64,
    verification_emails_sent: u64,
}

impl FakeState {
    fn snapshot(&self, email: &str) -> Option<AuthenticatedUser> {
        self.accounts.get(email).map(|account| AuthenticatedUser {
            id: account.id.clone(),
            email: Some(email.to_string()),
            display_name: account.display_name.clone(),
            email_verified: account.email_verified,
        })
    }
}

#[derive(Debug, Default)]
pub struct FakeAuthenticationGateway {
    inner: Mutex<FakeState>,
}

impl FakeAuthenticationGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a federated token so `sign_in_with_google` resolves it to
    /// `email`. Unknown tokens fail the exchange, like the real provider.
    pub async fn issue_google_token(&self, token: &str, email: &str) {
        let mut state = self.inner.lock().await;
        state.google_tokens.insert(token.to_string(), email.to_string());
    }

    /// Flips the verification flag, standing in for the user clicking the
    /// emailed link.
    pub async fn mark_verified(&self, email: &str) {
        let mut state = self.inner.lock().await;
        if let Some(account) = state.accounts.get_mut(email) {
            account.email_verified = true;
        }
    }

    /// How many verification emails have been requested so far.
    pub async fn verification_emails_sent(&self) -> u64 {
        self.inner.lock().await.verification_emails_sent
    }
}

#[async_trait]
impl AuthenticationGateway for FakeAuthenticationGateway {
    async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthenticatedUser> {
        let mut state = self.inner.lock().await;

        if state.accounts.contains_key(email) {
            return AuthResult::Error(UiMessage::EmailAlreadyInUse);
        }

        state.next_id += 1;
        let account = FakeAccount {
            id: format!("fake-user-{}", state.next_id),
            password: password.expose_secret().to_string(),
            display_name: Some(display_name(first_name, last_name)),
            email_verified: false,
        };
        state.accounts.insert(email.to_string(), account);
        state.current = Some(email.to_string());

        match state.snapshot(email) {
            Some(user) => AuthResult::Success(user),
            None => AuthResult::Error(UiMessage::AccountMissingAfterRegistration),
        }
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthenticatedUser> {
        let mut state = self.inner.lock().await;

        let matches = state
            .accounts
            .get(email)
            .map(|account| account.password == password.expose_secret());

        match matches {
            Some(true) => {
                state.current = Some(email.to_string());
                match state.snapshot(email) {
                    Some(user) => AuthResult::Success(user),
                    None => AuthResult::Error(UiMessage::SignInFailed),
                }
            }
            Some(false) | None => AuthResult::Error(UiMessage::InvalidCredentials),
        }
    }

    async fn sign_in_with_google(&self, id_token: &str) -> AuthResult<AuthenticatedUser> {
        let mut state = self.inner.lock().await;

        let Some(email) = state.google_tokens.get(id_token).cloned() else {
            return AuthResult::Error(UiMessage::GoogleSignInFailed);
        };

        if !state.accounts.contains_key(&email) {
            state.next_id += 1;
            let account = FakeAccount {
                id: format!("fake-user-{}", state.next_id),
                password: String::new(),
                display_name: None,
                // Federated accounts arrive with a provider-verified email.
                email_verified: true,
            };
            state.accounts.insert(email.clone(), account);
        }
        state.current = Some(email.clone());

        match state.snapshot(&email) {
            Some(user) => AuthResult::Success(user),
            None => AuthResult::Error(UiMessage::GoogleSignInFailed),
        }
    }

    async fn request_email_verification(&self) -> AuthResult<bool> {
        let mut state = self.inner.lock().await;

        if state.current.is_none() {
            return AuthResult::Error(UiMessage::VerificationSendFailed);
        }

        state.verification_emails_sent += 1;
        AuthResult::Success(true)
    }

    async fn is_current_user_verified(&self) -> bool {
        let state = self.inner.lock().await;

        state
            .current
            .as_ref()
            .and_then(|email| state.accounts.get(email))
            .map_or(false, |account| account.email_verified)
    }

    async fn current_user(&self) -> Option<AuthenticatedUser> {
        let state = self.inner.lock().await;
        state.current.as_ref().and_then(|email| state.snapshot(email))
    }

    async fn sign_out(&self) {
        let mut state = self.inner.lock().await;
        state.current = None;
    }
}
