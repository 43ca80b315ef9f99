//! End-to-end session behaviour against a mock catalog server.

mod support;

use std::time::Duration;

use futures::future::join_all;
use paperlens_core::{SessionEvent, TokenStorage};
use paperlens_domain::constants::DEFAULT_TOKEN_FILE;
use paperlens_domain::{ClientError, TokenPair, UserCredentials};
use paperlens_infra::{FileTokenStorage, PaperLensClient};
use serde_json::json;
use support::{
    client_for, drain_events, envelope, json_response, logged_in_client, paper_body,
    test_config, token_body, user_body,
};
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> UserCredentials {
    UserCredentials::new("reader@example.org", "correct horse")
}

#[tokio::test]
async fn login_stores_tokens_and_loads_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "reader@example.org", "password": "correct horse"})))
        .respond_with(json_response(200, envelope(token_body("A1", "R1"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(json_response(200, user_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut events = client.subscribe();

    let user = client.login(&credentials()).await.expect("login should succeed");

    assert_eq!(user.id, 42);
    assert!(client.is_authenticated());
    assert_eq!(client.current_user().map(|u| u.email), Some("reader@example.org".into()));
    assert_eq!(client.http().tokens().tokens(), Some(TokenPair::new("A1", "R1")));
    assert_eq!(drain_events(&mut events), vec![SessionEvent::LoggedIn]);
}

#[tokio::test]
async fn bad_credentials_are_an_http_error_not_a_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(json_response(401, json!({"detail": "Incorrect email or password"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(err.server_message().as_deref(), Some("Incorrect email or password"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_without_tokens_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(json_response(200, json!({"access_token": "A1"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();

    assert!(matches!(err, ClientError::MalformedResponse(_)), "got {err:?}");
    assert!(!client.http().tokens().has_tokens());
}

#[tokio::test]
async fn failed_user_load_after_login_clears_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(json_response(200, token_body("A1", "R1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(json_response(500, json!({"detail": "database down"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login(&credentials()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!client.http().tokens().has_tokens());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn expired_access_token_is_refreshed_and_request_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/papers/2301.00001"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(json_response(401, json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/papers/2301.00001"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(json_response(200, envelope(paper_body("2301.00001"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(json_response(200, token_body("A2", "R2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A1", "R1").await;
    let detail = client.get_paper_detail("2301.00001").await.expect("retry should succeed");

    assert_eq!(detail.arxiv_id, "2301.00001");
    assert_eq!(client.http().tokens().tokens(), Some(TokenPair::new("A2", "R2")));
}

#[tokio::test]
async fn concurrent_unauthorized_calls_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/papers/\d{4}\.\d{5}$"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/papers/\d{4}\.\d{5}$"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(json_response(200, paper_body("2301.00001")))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            json_response(200, token_body("A2", "R2")).set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A1", "R1").await;
    let ids: Vec<String> = (1..=5).map(|n| format!("2301.0000{n}")).collect();
    let results = join_all(ids.iter().map(|id| client.papers().paper_detail(id))).await;

    assert!(results.iter().all(Result::is_ok), "all calls should be retried: {results:?}");
    assert_eq!(client.http().tokens().access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn rejected_refresh_token_ends_session_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/papers/.+"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            json_response(401, json!({"detail": "Refresh token expired"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A1", "R1").await;
    let mut events = client.subscribe();

    let results = join_all(
        ["2301.00001", "2301.00002", "2301.00003"].map(|id| client.papers().paper_detail(id)),
    )
    .await;

    for result in &results {
        assert!(matches!(result, Err(ClientError::Auth(_))), "got {result:?}");
    }
    assert!(!client.http().tokens().has_tokens());
    assert!(!client.is_authenticated());
    assert_eq!(drain_events(&mut events), vec![SessionEvent::LogoutRequired]);
}

#[tokio::test]
async fn forced_refresh_rotates_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(json_response(200, envelope(token_body("A2", "R2"))))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A1", "R1").await;
    let token = client.refresh().await.expect("refresh should succeed");

    assert_eq!(token, "A2");
    assert_eq!(client.http().tokens().tokens(), Some(TokenPair::new("A2", "R2")));
}

#[tokio::test]
async fn logout_clears_session_even_if_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(body_json(json!({"refresh_token": "R1"})))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = logged_in_client(&server, "A1", "R1").await;
    let mut events = client.subscribe();

    client.logout().await;

    assert!(!client.http().tokens().has_tokens());
    assert!(client.current_user().is_none());
    assert_eq!(drain_events(&mut events), vec![SessionEvent::LoggedOut]);
}

#[tokio::test]
async fn initialize_restores_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(json_response(200, envelope(user_body())))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join(DEFAULT_TOKEN_FILE);
    FileTokenStorage::new(&token_path).store(&TokenPair::new("A1", "R1")).await.unwrap();

    let mut config = test_config(&server);
    config.storage.token_path = Some(token_path);
    let client = PaperLensClient::new(config).unwrap();

    assert!(client.initialize().await.unwrap());
    assert!(client.is_authenticated());
    assert_eq!(client.current_user().map(|u| u.id), Some(42));
}

#[tokio::test]
async fn initialize_without_tokens_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(json_response(200, user_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(!client.initialize().await.unwrap());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn failed_user_load_on_start_up_clears_persisted_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(json_response(500, json!({"detail": "database down"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join(DEFAULT_TOKEN_FILE);
    let storage = FileTokenStorage::new(&token_path);
    storage.store(&TokenPair::new("A1", "R1")).await.unwrap();

    let mut config = test_config(&server);
    config.storage.token_path = Some(token_path);
    let client = PaperLensClient::new(config).unwrap();

    assert!(!client.initialize().await.unwrap());
    assert!(!client.is_authenticated());
    assert!(!client.http().tokens().has_tokens());
    assert_eq!(storage.load().await.unwrap(), None);
}
