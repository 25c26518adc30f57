//! Thin wrappers over the provider's `accounts:*` operations.
//!
//! Each wrapper builds the endpoint, posts a JSON payload with the API key,
//! and probes the response body for the fields the gateway needs. Error
//! bodies are classified by [`ProviderError::from_response`].

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{info_span, Instrument};

use crate::provider::{endpoint_url, ProviderConfig, ProviderError};

/// Credentials returned by the provider when a session is opened.
#[derive(Debug)]
pub(crate) struct ProviderSession {
    pub local_id: String,
    pub id_token: SecretString,
}

/// Account fields reported by `accounts:lookup`.
#[derive(Debug)]
pub(crate) struct AccountInfo {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

pub(crate) async fn sign_up(
    client: &Client,
    config: &ProviderConfig,
    email: &str,
    password: &SecretString,
) -> Result<ProviderSession, ProviderError> {
    let payload = json!({
        "email": email,
        "password": password.expose_secret(),
        "returnSecureToken": true,
    });

    let json_response = post_operation(client, config, "signUp", &payload).await?;

    session_from(&json_response)
}

pub(crate) async fn sign_in_with_password(
    client: &Client,
    config: &ProviderConfig,
    email: &str,
    password: &SecretString,
) -> Result<ProviderSession, ProviderError> {
    let payload = json!({
        "email": email,
        "password": password.expose_secret(),
        "returnSecureToken": true,
    });

    let json_response = post_operation(client, config, "signInWithPassword", &payload).await?;

    session_from(&json_response)
}

pub(crate) async fn sign_in_with_idp(
    client: &Client,
    config: &ProviderConfig,
    id_token: &str,
) -> Result<ProviderSession, ProviderError> {
    let payload = json!({
        "postBody": format!("id_token={id_token}&providerId=google.com"),
        "requestUri": "http://localhost",
        "returnSecureToken": true,
        "returnIdpCredential": true,
    });

    let json_response = post_operation(client, config, "signInWithIdp", &payload).await?;

    session_from(&json_response)
}

/// Sets the profile display name on an open session.
pub(crate) async fn update_profile(
    client: &Client,
    config: &ProviderConfig,
    id_token: &SecretString,
    display_name: &str,
) -> Result<(), ProviderError> {
    let payload = json!({
        "idToken": id_token.expose_secret(),
        "displayName": display_name,
        "returnSecureToken": false,
    });

    post_operation(client, config, "update", &payload).await?;

    Ok(())
}

/// Asks the provider to send the verification email for an open session.
pub(crate) async fn send_verification_email(
    client: &Client,
    config: &ProviderConfig,
    id_token: &SecretString,
) -> Result<(), ProviderError> {
    let payload = json!({
        "requestType": "VERIFY_EMAIL",
        "idToken": id_token.expose_secret(),
    });

    post_operation(client, config, "sendOobCode", &payload).await?;

    Ok(())
}

/// Reloads the account behind an open session.
pub(crate) async fn lookup(
    client: &Client,
    config: &ProviderConfig,
    id_token: &SecretString,
) -> Result<AccountInfo, ProviderError> {
    let payload = json!({
        "idToken": id_token.expose_secret(),
    });

    let json_response = post_operation(client, config, "lookup", &payload).await?;

    account_from(&json_response)
}

async fn post_operation(
    client: &Client,
    config: &ProviderConfig,
    operation: &str,
    payload: &Value,
) -> Result<Value, ProviderError> {
    let url = endpoint_url(&config.api_url, operation)?;

    let span = info_span!(
        "provider.accounts",
        operation,
        http.method = "POST"
    );
    let response = client
        .post(&url)
        .query(&[("key", config.api_key.expose_secret())])
        .json(payload)
        .send()
        .instrument(span)
        .await
        .map_err(ProviderError::from_transport)?;

    if !response.status().is_success() {
        let status = response.status();
        // Error bodies are best-effort JSON; anything else classifies as an
        // empty code.
        let json_response: Value = response.json().await.unwrap_or(Value::Null);

        return Err(ProviderError::from_response(status, &json_response));
    }

    response.json().await.map_err(ProviderError::from_transport)
}

fn session_from(json_response: &Value) -> Result<ProviderSession, ProviderError> {
    let local_id = json_response
        .get("localId")
        .and_then(Value::as_str)
        .ok_or(ProviderError::MissingField("localId"))?;
    let id_token = json_response
        .get("idToken")
        .and_then(Value::as_str)
        .ok_or(ProviderError::MissingField("idToken"))?;

    Ok(ProviderSession {
        local_id: local_id.to_string(),
        id_token: SecretString::from(id_token.to_string()),
    })
}

fn account_from(json_response: &Value) -> Result<AccountInfo, ProviderError> {
    let user = json_response
        .get("users")
        .and_then(|users| users.get(0))
        .ok_or(ProviderError::MissingField("users"))?;

    let local_id = user
        .get("localId")
        .and_then(Value::as_str)
        .ok_or(ProviderError::MissingField("localId"))?;

    Ok(AccountInfo {
        local_id: local_id.to_string(),
        email: user
            .get("email")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        display_name: user
            .get("displayName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string),
        email_verified: user
            .get("emailVerified")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}
