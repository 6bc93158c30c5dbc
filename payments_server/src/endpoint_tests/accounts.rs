use actix_web::{http::StatusCode, test::TestRequest};
use payments_engine::{helpers::hash_password, traits::AccountApiError};

use super::{
    helpers::{account, configure_accounts, get_auth_config, send_request},
    mocks::MockAccountManager,
};
use crate::auth::TokenIssuer;

fn post(uri: &str, body: &str) -> TestRequest {
    TestRequest::post().uri(uri).insert_header(("Content-Type", "application/json")).set_payload(body.to_string())
}

fn register_request(body: &str) -> TestRequest {
    post("/v1/accounts", body)
}

fn login_request(body: &str) -> TestRequest {
    post("/v1/login", body)
}

#[actix_web::test]
async fn register_new_account() {
    let _ = env_logger::try_init();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().times(1).returning(|email| {
        assert_eq!(email, "alice@example.com");
        Ok(None)
    });
    accounts.expect_insert_account().times(1).returning(|new_account| {
        assert_ne!(new_account.password_hash, "secret1", "Password must be hashed before it is stored");
        Ok(account(1, &new_account.email, &new_account.password_hash))
    });
    let res = send_request(
        register_request(r#"{"email": "alice@example.com", "password": "secret1"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let json = res.json();
    assert_eq!(json["errors"], serde_json::json!([]));
    assert_eq!(json["links"], serde_json::json!([]));
    assert_eq!(json["data"]["id"], 1);
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["password"], "");
    assert!(json["data"].get("password_hash").is_none());
    let token = json["data"]["token"].as_str().expect("token missing");
    let claims = TokenIssuer::new(&get_auth_config()).verify(token).expect("Token does not verify");
    assert_eq!(claims.sub, 1);
    assert_eq!(claims.exp - claims.iat, 12 * 3600);
}

#[actix_web::test]
async fn register_without_at_sign() {
    let _ = env_logger::try_init();
    // No expectations: the database must not be touched
    let res = send_request(
        register_request(r#"{"email": "not-an-email", "password": "secret1"}"#),
        configure_accounts(MockAccountManager::new()),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["Email address is required"]);
}

#[actix_web::test]
async fn register_with_short_password() {
    let _ = env_logger::try_init();
    let res = send_request(
        register_request(r#"{"email": "alice@example.com", "password": "12345"}"#),
        configure_accounts(MockAccountManager::new()),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["Password is required"]);
    // Missing fields are treated as empty
    let res =
        send_request(register_request(r#"{"email": "alice@example.com"}"#), configure_accounts(MockAccountManager::new()))
            .await;
    assert_eq!(res.errors(), vec!["Password is required"]);
}

#[actix_web::test]
async fn register_duplicate_email() {
    let _ = env_logger::try_init();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().returning(|email| Ok(Some(account(5, email, "$argon2id$..."))));
    let res = send_request(
        register_request(r#"{"email": "bob@example.com", "password": "secret1"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["Email address already in use by another user"]);
}

#[actix_web::test]
async fn register_lookup_failure_is_an_internal_error() {
    let _ = env_logger::try_init();
    let mut accounts = MockAccountManager::new();
    accounts
        .expect_fetch_account_by_email()
        .returning(|_| Err(AccountApiError::DatabaseError("database is locked".into())));
    let res = send_request(
        register_request(r#"{"email": "bob@example.com", "password": "secret1"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.errors(), vec!["Internal server error"]);
}

#[actix_web::test]
async fn register_malformed_json() {
    let _ = env_logger::try_init();
    let res = send_request(register_request(r#"{"email": "alice@"#), configure_accounts(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let errors = res.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "Invalid JSON request");
}

#[actix_web::test]
async fn register_null_body_fails_the_field_checks() {
    let _ = env_logger::try_init();
    let res = send_request(register_request("null"), configure_accounts(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["Email address is required"]);
}

#[actix_web::test]
async fn login_malformed_json() {
    let _ = env_logger::try_init();
    let res = send_request(login_request(r#"{"email": ["#), configure_accounts(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let errors = res.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "Invalid JSON request");
}

#[actix_web::test]
async fn login_null_body_is_an_unknown_email() {
    let _ = env_logger::try_init();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().times(1).returning(|email| {
        assert_eq!(email, "");
        Ok(None)
    });
    let res = send_request(login_request("null"), configure_accounts(accounts)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.errors(), vec!["Email address not found"]);
}

#[actix_web::test]
async fn login() {
    let _ = env_logger::try_init();
    let hash = hash_password("correct horse").unwrap();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().returning(move |email| Ok(Some(account(9, email, &hash))));
    let res = send_request(
        login_request(r#"{"email": "carol@example.com", "password": "correct horse"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["data"]["id"], 9);
    assert_eq!(json["data"]["password"], "");
    let token = json["data"]["token"].as_str().expect("token missing");
    assert_eq!(TokenIssuer::new(&get_auth_config()).verify(token).unwrap().sub, 9);
}

#[actix_web::test]
async fn login_wrong_password() {
    let _ = env_logger::try_init();
    let hash = hash_password("correct horse").unwrap();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().returning(move |email| Ok(Some(account(9, email, &hash))));
    let res = send_request(
        login_request(r#"{"email": "carol@example.com", "password": "battery staple"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.errors(), vec!["Invalid login credentials. Please try again"]);
}

#[actix_web::test]
async fn login_unknown_email() {
    let _ = env_logger::try_init();
    let mut accounts = MockAccountManager::new();
    accounts.expect_fetch_account_by_email().returning(|_| Ok(None));
    let res = send_request(
        login_request(r#"{"email": "nobody@example.com", "password": "whatever"}"#),
        configure_accounts(accounts),
    )
    .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.errors(), vec!["Email address not found"]);
}
