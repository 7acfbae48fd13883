mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new().await;
    let reply = app.call("GET", "/api/auth/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({"status": "ok"}));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = TestApp::new().await;

    let first = app.register("traveller", "password123").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert!(first.json()["message"].is_string());

    let second = app.register("traveller", "different-pass").await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.json()["error"], "Username already exists");
}

#[tokio::test]
async fn register_validates_birthday() {
    let app = TestApp::new().await;
    let reply = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "kim",
                "email": "kim@example.com",
                "password": "password123",
                "birthday": "13/01/1990",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Invalid birthday: expected YYYY-MM-DD");
}

#[tokio::test]
async fn register_without_password_is_bad_request() {
    let app = TestApp::new().await;
    let reply = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"username": "kim", "email": "kim@example.com"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["error"].is_string());
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = TestApp::new().await;
    app.register("traveller", "password123").await;

    let wrong = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "traveller", "password": "nope"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "ghost", "password": "password123"})),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);

    let ok = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "traveller", "password": "password123"})),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert!(!ok.json()["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = TestApp::new().await;

    let missing = app.call("GET", "/api/journal/", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.json()["error"], "Unauthorized");

    let garbage = app.call("GET", "/api/map/markers", Some("not.a.jwt"), None).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_read_partial_update_and_delete() {
    let app = TestApp::new().await;
    let reply = app
        .call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "ana",
                "email": "ana@example.com",
                "password": "password123",
                "nickname": "Ana",
                "birthday": "1990-01-01",
                "phone": "13800138000",
            })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let login = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"username": "ana", "password": "password123"})),
        )
        .await;
    let token = login.json()["token"].as_str().unwrap().to_string();

    let profile = app.call("GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(
        profile.json(),
        json!({
            "username": "ana",
            "email": "ana@example.com",
            "nickname": "Ana",
            "birthday": "1990-01-01",
            "phone": "13800138000",
            "preferences": null,
        })
    );

    let update = app
        .call(
            "PUT",
            "/api/auth/profile",
            Some(&token),
            Some(json!({"nickname": "Ana B", "preferences": {"units": "metric"}})),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK);

    let profile = app.call("GET", "/api/auth/profile", Some(&token), None).await.json();
    assert_eq!(profile["nickname"], "Ana B");
    assert_eq!(profile["email"], "ana@example.com");
    assert_eq!(profile["birthday"], "1990-01-01");
    assert_eq!(profile["preferences"], json!({"units": "metric"}));

    let deleted = app.call("DELETE", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    // The token is still valid, the account is not
    let gone = app.call("GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let write = app
        .call("POST", "/api/journal/", Some(&token), Some(json!({"content": "x"})))
        .await;
    assert_eq!(write.status, StatusCode::NOT_FOUND);
}
