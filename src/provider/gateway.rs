//! Production gateway backed by the provider's accounts API.
//!
//! Holds the open session (ID token plus the last snapshot) behind a lock,
//! standing in for the vendor SDK's internal session object. Mapping policy:
//! recognized provider failures become their specific [`UiMessage`], the rest
//! are logged with full detail and collapsed to the operation's generic
//! message.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::gateway::{display_name, AuthenticatedUser, AuthenticationGateway};
use crate::message::UiMessage;
use crate::provider::accounts::{self, ProviderSession};
use crate::provider::{client, ProviderConfig, ProviderError};
use crate::result::AuthResult;

#[derive(Debug)]
struct Session {
    id_token: SecretString,
    user: AuthenticatedUser,
}

pub struct ProviderGateway {
    client: Client,
    config: ProviderConfig,
    session: RwLock<Option<Session>>,
}

impl ProviderGateway {
    /// # Errors
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = client(config.timeout)?;

        Ok(Self {
            client,
            config,
            session: RwLock::new(None),
        })
    }

    /// Builds the gateway from `ENTRATA_PROVIDER_*` environment variables.
    ///
    /// # Errors
    /// Returns an error when the variables are unset or the HTTP client
    /// cannot be constructed.
    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    async fn store_session(&self, provider_session: ProviderSession, user: AuthenticatedUser) {
        let mut session = self.session.write().await;
        *session = Some(Session {
            id_token: provider_session.id_token,
            user,
        });
    }

    async fn current_id_token(&self) -> Option<SecretString> {
        let session = self.session.read().await;
        session.as_ref().map(|s| s.id_token.clone())
    }

    /// Builds the snapshot for a freshly opened session by reloading the
    /// account, then stores both.
    async fn adopt_session(
        &self,
        provider_session: ProviderSession,
    ) -> Result<AuthenticatedUser, ProviderError> {
        let account =
            accounts::lookup(&self.client, &self.config, &provider_session.id_token).await?;

        let user = AuthenticatedUser {
            id: account.local_id,
            email: account.email,
            display_name: account.display_name,
            email_verified: account.email_verified,
        };

        self.store_session(provider_session, user.clone()).await;

        Ok(user)
    }
}

fn map_registration_error(err: ProviderError) -> UiMessage {
    match err {
        ProviderError::EmailExists => UiMessage::EmailAlreadyInUse,
        ProviderError::Network(_) => UiMessage::Network,
        // A success response the session cannot be built from.
        ProviderError::MissingField(_) => UiMessage::AccountMissingAfterRegistration,
        err => {
            error!("Registration failed: {err}");
            UiMessage::RegistrationFailed
        }
    }
}

fn map_sign_in_error(err: ProviderError) -> UiMessage {
    match err {
        ProviderError::InvalidCredentials => UiMessage::InvalidCredentials,
        ProviderError::Network(_) => UiMessage::Network,
        ProviderError::TooManyAttempts => UiMessage::TooManyRequests,
        err => {
            error!("Sign-in failed: {err}");
            UiMessage::SignInFailed
        }
    }
}

fn map_google_sign_in_error(err: ProviderError) -> UiMessage {
    match err {
        ProviderError::Network(_) => UiMessage::Network,
        err => {
            error!("Google sign-in failed: {err}");
            UiMessage::GoogleSignInFailed
        }
    }
}

fn map_verification_send_error(err: ProviderError) -> UiMessage {
    match err {
        ProviderError::Network(_) => UiMessage::Network,
        ProviderError::TooManyAttempts => UiMessage::TooManyRequests,
        err => {
            error!("Send email verification failed: {err}");
            UiMessage::VerificationSendFailed
        }
    }
}

#[async_trait]
impl AuthenticationGateway for ProviderGateway {
    async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthenticatedUser> {
        let provider_session =
            match accounts::sign_up(&self.client, &self.config, email, password).await {
                Ok(session) => session,
                Err(err) => return AuthResult::Error(map_registration_error(err)),
            };

        // Best-effort: a failed profile update must not undo a successful
        // registration.
        let name = display_name(first_name, last_name);
        let profile_name = match accounts::update_profile(
            &self.client,
            &self.config,
            &provider_session.id_token,
            &name,
        )
        .await
        {
            Ok(()) => Some(name),
            Err(err) => {
                warn!("Profile update after registration failed: {err}");
                None
            }
        };

        let user = AuthenticatedUser {
            id: provider_session.local_id.clone(),
            email: Some(email.to_string()),
            display_name: profile_name,
            email_verified: false,
        };
        self.store_session(provider_session, user.clone()).await;

        AuthResult::Success(user)
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AuthResult<AuthenticatedUser> {
        let provider_session =
            match accounts::sign_in_with_password(&self.client, &self.config, email, password)
                .await
            {
                Ok(session) => session,
                Err(err) => return AuthResult::Error(map_sign_in_error(err)),
            };

        match self.adopt_session(provider_session).await {
            Ok(user) => AuthResult::Success(user),
            Err(err) => AuthResult::Error(map_sign_in_error(err)),
        }
    }

    async fn sign_in_with_google(&self, id_token: &str) -> AuthResult<AuthenticatedUser> {
        let provider_session =
            match accounts::sign_in_with_idp(&self.client, &self.config, id_token).await {
                Ok(session) => session,
                Err(err) => return AuthResult::Error(map_google_sign_in_error(err)),
            };

        match self.adopt_session(provider_session).await {
            Ok(user) => AuthResult::Success(user),
            Err(err) => AuthResult::Error(map_google_sign_in_error(err)),
        }
    }

    async fn request_email_verification(&self) -> AuthResult<bool> {
        let Some(id_token) = self.current_id_token().await else {
            debug!("verification email requested without a session");
            return AuthResult::Error(UiMessage::VerificationSendFailed);
        };

        match accounts::send_verification_email(&self.client, &self.config, &id_token).await {
            Ok(()) => AuthResult::Success(true),
            Err(err) => AuthResult::Error(map_verification_send_error(err)),
        }
    }

    async fn is_current_user_verified(&self) -> bool {
        let Some(id_token) = self.current_id_token().await else {
            return false;
        };

        match accounts::lookup(&self.client, &self.config, &id_token).await {
            Ok(account) => {
                let verified = account.email_verified;

                let mut session = self.session.write().await;
                if let Some(session) = session.as_mut() {
                    session.user.email_verified = verified;
                    session.user.email = account.email;
                    session.user.display_name = account.display_name;
                }

                verified
            }
            Err(err) => {
                // Transient refresh failures are reported as "not verified";
                // the log line is the only place the distinction survives.
                error!("Verification status refresh failed: {err}");
                false
            }
        }
    }

    async fn current_user(&self) -> Option<AuthenticatedUser> {
        let session = self.session.read().await;
        session.as_ref().map(|s| s.user.clone())
    }

    async fn sign_out(&self) {
        let mut session = self.session.write().await;
        *session = None;
        debug!("session cleared");
    }
}
