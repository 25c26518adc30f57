//! REST adapter for the external identity provider.
//!
//! The provider exposes an accounts API where every operation is a `POST` to
//! `{base}/v1/accounts:{op}` with the project API key as a `key` query
//! parameter and a JSON body. Failures come back as a JSON object whose
//! `error.message` field carries an upper-snake error code; those codes are
//! classified into [`ProviderError`] here and mapped to user-displayable
//! messages in [`gateway`].

pub mod accounts;
pub mod gateway;
pub use gateway::ProviderGateway;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::Value;
use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::APP_USER_AGENT;

pub const ENV_PROVIDER_URL: &str = "ENTRATA_PROVIDER_URL";
pub const ENV_PROVIDER_API_KEY: &str = "ENTRATA_PROVIDER_API_KEY";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            api_url: api_url.into(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the config from `ENTRATA_PROVIDER_URL` and
    /// `ENTRATA_PROVIDER_API_KEY`.
    ///
    /// # Errors
    /// Returns an error when either variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var(ENV_PROVIDER_URL)
            .with_context(|| format!("{ENV_PROVIDER_URL} not defined"))?;
        let api_key = env::var(ENV_PROVIDER_API_KEY)
            .with_context(|| format!("{ENV_PROVIDER_API_KEY} not defined"))?;

        Ok(Self::new(api_url, SecretString::from(api_key)))
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("email already in use")]
    EmailExists,
    #[error("too many attempts, try again later")]
    TooManyAttempts,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("network error: {0}")]
    Network(String),
    #[error("provider rejected the request ({status}): {code}")]
    Api { status: u16, code: String },
    #[error("missing `{0}` in provider response")]
    MissingField(&'static str),
    #[error("invalid provider URL: {0}")]
    Url(String),
}

impl ProviderError {
    pub(crate) fn from_response(status: StatusCode, body: &Value) -> Self {
        match provider_error_code(body) {
            "EMAIL_EXISTS" => Self::EmailExists,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "INVALID_LOGIN_CREDENTIALS" | "EMAIL_NOT_FOUND" | "INVALID_PASSWORD"
            | "USER_DISABLED" => Self::InvalidCredentials,
            code => Self::Api {
                status: status.as_u16(),
                code: code.to_string(),
            },
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        // The URL carries the API key in its query string; strip it before
        // the error can be logged.
        Self::Network(err.without_url().to_string())
    }
}

/// Pulls the upper-snake error code out of a provider error body.
fn provider_error_code(body: &Value) -> &str {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// Builds the URL for an accounts operation, normalizing the configured base.
///
/// # Errors
/// Returns [`ProviderError::Url`] when the base cannot be parsed, has no host,
/// or uses a scheme other than http/https.
pub(crate) fn endpoint_url(api_url: &str, operation: &str) -> Result<String, ProviderError> {
    let url = Url::parse(api_url).map_err(|err| ProviderError::Url(err.to_string()))?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| ProviderError::Url("no host specified".to_string()))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(ProviderError::Url(format!("unsupported scheme {scheme}"))),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}/v1/accounts:{operation}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

pub(crate) fn client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Network(err.to_string()))
}
