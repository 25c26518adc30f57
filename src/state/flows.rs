//! Flow drivers: what each authentication screen does with a gateway outcome.
//!
//! A flow disables its screen for the duration of the call, then either arms
//! the navigation trigger or raises the one-shot error and re-enables the
//! controls. Input validation happens before any provider round-trip.

use std::sync::Arc;

use secrecy::SecretString;

use crate::gateway::{AuthenticatedUser, AuthenticationGateway};
use crate::message::UiMessage;
use crate::result::AuthResult;
use crate::state::ScreenState;
use crate::validate::{valid_email, valid_password};

/// Drives the registration screen.
pub struct RegistrationFlow {
    gateway: Arc<dyn AuthenticationGateway>,
    state: ScreenState,
    registered_user: Option<AuthenticatedUser>,
}

impl RegistrationFlow {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthenticationGateway>) -> Self {
        Self {
            gateway,
            state: ScreenState::new(),
            registered_user: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ScreenState {
        &self.state
    }

    /// The snapshot from the last successful registration, held only until
    /// the screen navigates away.
    #[must_use]
    pub fn registered_user(&self) -> Option<&AuthenticatedUser> {
        self.registered_user.as_ref()
    }

    pub fn acknowledge_error(&mut self) {
        self.state.acknowledge_error();
    }

    pub fn acknowledge_navigation(&mut self) {
        self.state.acknowledge_navigation();
    }

    pub async fn register(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &SecretString,
    ) {
        if first_name.trim().is_empty() || last_name.trim().is_empty() || !valid_email(email) {
            self.state.fail(UiMessage::RegistrationFailed);
            return;
        }
        if !valid_password(password) {
            self.state.fail(UiMessage::InvalidCredentials);
            return;
        }

        self.state.begin();

        match self
            .gateway
            .register(first_name, last_name, email, password)
            .await
        {
            AuthResult::Success(user) => {
                self.registered_user = Some(user);
                self.state.succeed();
            }
            AuthResult::Error(message) => self.state.fail(message),
        }
    }

    /// Triggers the verification email for the account just registered. The
    /// screen stays put either way; only an error is observable.
    pub async fn send_verification_email(&mut self) {
        self.state.begin();

        match self.gateway.request_email_verification().await {
            AuthResult::Success(_) => self.state.finish(),
            AuthResult::Error(message) => self.state.fail(message),
        }
    }
}

/// Drives the sign-in screen, covering both password and Google one-tap
/// entry points.
pub struct SignInFlow {
    gateway: Arc<dyn AuthenticationGateway>,
    state: ScreenState,
    signed_in_user: Option<AuthenticatedUser>,
}

impl SignInFlow {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthenticationGateway>) -> Self {
        Self {
            gateway,
            state: ScreenState::new(),
            signed_in_user: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ScreenState {
        &self.state
    }

    #[must_use]
    pub fn signed_in_user(&self) -> Option<&AuthenticatedUser> {
        self.signed_in_user.as_ref()
    }

    pub fn acknowledge_error(&mut self) {
        self.state.acknowledge_error();
    }

    pub fn acknowledge_navigation(&mut self) {
        self.state.acknowledge_navigation();
    }

    pub async fn sign_in(&mut self, email: &str, password: &SecretString) {
        if !valid_email(email) || !valid_password(password) {
            self.state.fail(UiMessage::InvalidCredentials);
            return;
        }

        self.state.begin();

        match self.gateway.sign_in(email, password).await {
            AuthResult::Success(user) => {
                self.signed_in_user = Some(user);
                self.state.succeed();
            }
            AuthResult::Error(message) => self.state.fail(message),
        }
    }

    /// Completes the one-tap flow with the ID token handed back by the
    /// federated sign-in dialog.
    pub async fn finish_google_sign_in(&mut self, id_token: &str) {
        self.state.begin();

        match self.gateway.sign_in_with_google(id_token).await {
            AuthResult::Success(user) => {
                self.signed_in_user = Some(user);
                self.state.succeed();
            }
            AuthResult::Error(message) => self.state.fail(message),
        }
    }

    /// Reports a failure raised by the one-tap dialog itself (cancelled,
    /// no token, transport error) without touching the gateway.
    pub fn on_google_sign_in_failed(&mut self, message: UiMessage) {
        self.state.fail(message);
    }
}
