//! End-to-end gateway behavior against a mock provider.

use entrata::provider::ProviderConfig;
use entrata::{AuthResult, AuthenticationGateway, ProviderGateway, UiMessage};
use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn gateway_for(server: &MockServer) -> ProviderGateway {
    let config = ProviderConfig::new(server.uri(), SecretString::from("test-key"));
    ProviderGateway::new(config).expect("gateway should build")
}

fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4().simple())
}

fn password() -> SecretString {
    SecretString::from("pw123456")
}

#[tokio::test]
async fn register_verify_and_check_round_trip() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-1",
            "idToken": "token-abc",
            "email": "ada@x.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(body_partial_json(json!({"displayName": "Ada Lovelace"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-1",
            "displayName": "Ada Lovelace"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:sendOobCode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "ada@x.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "localId": "uid-1",
                "email": "ada@x.com",
                "displayName": "Ada Lovelace",
                "emailVerified": true
            }]
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);

    let result = gateway
        .register("Ada", "Lovelace", "ada@x.com", &password())
        .await;
    let user = result.success().expect("registration should succeed");
    assert_eq!(user.id, "uid-1");
    assert_eq!(user.email.as_deref(), Some("ada@x.com"));
    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(!user.email_verified);

    let sent = gateway.request_email_verification().await;
    assert_eq!(sent, AuthResult::Success(true));

    // The flag comes back refreshed from the provider, not from the cached
    // registration snapshot.
    assert!(gateway.is_current_user_verified().await);
    let refreshed = gateway.current_user().await.expect("session should exist");
    assert!(refreshed.email_verified);
}

#[tokio::test]
async fn trims_name_components_when_building_the_profile() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-2",
            "idToken": "token-def"
        })))
        .mount(&server)
        .await;
    // The mock only matches the trimmed, single-spaced name.
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(body_partial_json(json!({"displayName": "Ada Lovelace"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway
        .register("  Ada ", " Lovelace  ", &unique_email(), &password())
        .await;

    assert_eq!(
        result.success().and_then(|user| user.display_name),
        Some("Ada Lovelace".to_string())
    );
}

#[tokio::test]
async fn duplicate_account_is_never_the_generic_error() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "EMAIL_EXISTS"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway
        .register("Ada", "Lovelace", "ada@x.com", &password())
        .await;

    assert_eq!(result.error(), Some(UiMessage::EmailAlreadyInUse));
}

#[tokio::test]
async fn success_without_a_session_is_the_anomalous_state_error() {
    init_tracing();
    let server = MockServer::start().await;

    // 200 with no idToken: the provider claims success but hands back no
    // usable session.
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#SignupNewUserResponse"
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway
        .register("Ada", "Lovelace", "ada@x.com", &password())
        .await;

    assert_eq!(
        result.error(),
        Some(UiMessage::AccountMissingAfterRegistration)
    );
}

#[tokio::test]
async fn failed_profile_update_does_not_undo_registration() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-3",
            "idToken": "token-ghi"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "INTERNAL_ERROR"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway
        .register("Ada", "Lovelace", "ada@x.com", &password())
        .await;

    let user = result.success().expect("registration should still succeed");
    assert_eq!(user.display_name, None);
}

#[tokio::test]
async fn unauthenticated_checks_perform_no_network_calls() {
    init_tracing();
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    assert!(!gateway.is_current_user_verified().await);
    assert_eq!(
        gateway.request_email_verification().await.error(),
        Some(UiMessage::VerificationSendFailed)
    );
    assert!(gateway.current_user().await.is_none());

    let requests = server
        .received_requests()
        .await
        .expect("request recording should be on");
    assert!(requests.is_empty(), "expected no provider traffic");
}

#[tokio::test]
async fn wrong_password_maps_to_invalid_credentials() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let result = gateway.sign_in("ada@x.com", &password()).await;

    assert_eq!(result.error(), Some(UiMessage::InvalidCredentials));
}

#[tokio::test]
async fn sign_in_rebuilds_the_snapshot_from_lookup() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-4",
            "idToken": "token-jkl",
            "email": "ada@x.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "localId": "uid-4",
                "email": "ada@x.com",
                "displayName": "Ada Lovelace",
                "emailVerified": true
            }]
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let user = gateway
        .sign_in("ada@x.com", &password())
        .await
        .success()
        .expect("sign-in should succeed");

    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(user.email_verified);
}

#[tokio::test]
async fn refresh_failures_read_as_not_verified() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-5",
            "idToken": "token-mno"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:lookup"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "INTERNAL_ERROR"}
        })))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    gateway
        .register("Ada", "Lovelace", "ada@x.com", &password())
        .await;

    assert!(!gateway.is_current_user_verified().await);
}

#[tokio::test]
async fn sign_out_drops_the_session() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-6",
            "idToken": "token-pqr"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    gateway
        .register("Ada", "Lovelace", &unique_email(), &password())
        .await;
    assert!(gateway.current_user().await.is_some());

    gateway.sign_out().await;

    assert!(gateway.current_user().await.is_none());
    assert!(!gateway.is_current_user_verified().await);
}
