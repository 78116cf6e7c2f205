//! HTTP-level tests for registration, login, token refresh, logout and the
//! caller's profile.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user_with_role, get_auth, post_json, post_json_auth, put_json_auth,
    token_for, TEST_PASSWORD,
};
use pmo_core::roles::{DEFAULT_ROLE, ROLE_PMO_DIRECTOR};
use sqlx::PgPool;

async fn login(app: axum::Router, username: &str, password: &str) -> axum::response::Response {
    let body = serde_json::json!({ "username": username, "password": password });
    post_json(app, "/api/v1/auth/login", body).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_assigns_default_role(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "newcomer",
        "email": "newcomer@test.com",
        "password": "long-enough-pw",
        "first_name": "New",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["role"], DEFAULT_ROLE);
    assert_eq!(json["user"]["is_admin"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "shorty",
        "email": "shorty@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_taken_username(pool: PgPool) {
    create_user_with_role(&pool, "taken", DEFAULT_ROLE).await;
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "taken",
        "email": "other@test.com",
        "password": "long-enough-pw",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_success_returns_tokens(pool: PgPool) {
    let user = create_user_with_role(&pool, "loginuser", ROLE_PMO_DIRECTOR).await;
    let app = common::build_test_app(pool);

    let response = login(app, "loginuser", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["expires_in"].is_number());
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], ROLE_PMO_DIRECTOR);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    create_user_with_role(&pool, "wrongpw", DEFAULT_ROLE).await;
    let app = common::build_test_app(pool);

    let response = login(app, "wrongpw", "incorrect_password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_for_unknown_user_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = login(app, "ghost", "whatever").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_the_account(pool: PgPool) {
    create_user_with_role(&pool, "locked", DEFAULT_ROLE).await;

    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let response = login(app, "locked", "bad-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while the lock holds.
    let app = common::build_test_app(pool);
    let response = login(app, "locked", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_token_rotates(pool: PgPool) {
    create_user_with_role(&pool, "refresher", DEFAULT_ROLE).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(login(app, "refresher", TEST_PASSWORD).await).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();
    let body = serde_json::json!({ "refresh_token": refresh_token });

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], json["refresh_token"]);

    // The old refresh token was consumed.
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_user_with_role(&pool, "leaver", DEFAULT_ROLE).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(login(app, "leaver", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/auth/logout", serde_json::json!({}), &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_reports_role_permissions(pool: PgPool) {
    let user = create_user_with_role(&pool, "director", ROLE_PMO_DIRECTOR).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["username"], "director");
    assert_eq!(json["is_admin"], false);
    assert_eq!(json["is_pmo_director"], true);
    assert_eq!(json["can_edit_projects"], true);
    assert!(json.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_changes_only_given_fields(pool: PgPool) {
    let user = create_user_with_role(&pool, "editor", DEFAULT_ROLE).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "department": "PMO", "email_notifications": false });
    let response = put_json_auth(app, "/api/v1/auth/me", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["department"], "PMO");
    assert_eq!(json["email_notifications"], false);
    assert_eq!(json["first_name"], "Test");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn profile_update_rejects_bad_email(pool: PgPool) {
    let user = create_user_with_role(&pool, "bademail", DEFAULT_ROLE).await;
    let token = token_for(&user);
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "not-an-email" });
    let response = put_json_auth(app, "/api/v1/auth/me", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
