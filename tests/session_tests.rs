mod common;

use axum::{Form, Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use common::{api_path, client_state, memory_storage, mint_token, spawn_backend, valid_token};
use hrm_console::{ApiError, auth::Role};
use serde_json::json;
use std::collections::HashMap;

// --- Fake Login Endpoint ---

async fn login(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();

    match (username.as_str(), password.as_str()) {
        ("hr@corp.vn", "secret") => (
            StatusCode::OK,
            Json(json!({
                "access_token": mint_token("hr@corp.vn", Role::HrManager, Some(3), 3600),
                "token_type": "bearer"
            })),
        ),
        ("payroll@corp.vn", "secret") => (
            StatusCode::OK,
            Json(json!({
                "access_token": mint_token("payroll@corp.vn", Role::PayrollManager, None, 3600),
                "token_type": "bearer"
            })),
        ),
        ("broken@corp.vn", _) => (
            StatusCode::OK,
            Json(json!({"access_token": "not-a-jwt", "token_type": "bearer"})),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        ),
    }
}

async fn backend() -> String {
    spawn_backend(Router::new().route(&api_path("/login"), post(login))).await
}

// --- Session Store ---

#[tokio::test]
async fn login_persists_token_and_returns_its_claims() {
    let base = backend().await;
    let (state, _) = client_state(&base, memory_storage(None));

    let user = state.session.login("hr@corp.vn", "secret").await.unwrap();

    assert_eq!(user.email, "hr@corp.vn");
    assert_eq!(user.role, Role::HrManager);
    assert_eq!(user.employee_id, Some(3));
    assert!(state.storage.token().is_some());
    assert_eq!(state.session.current_user(), Some(user));
}

#[tokio::test]
async fn rejected_credentials_leave_storage_untouched() {
    let base = backend().await;
    let (state, _) = client_state(&base, memory_storage(None));

    let err = state.session.login("hr@corp.vn", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.detail(), Some("Incorrect email or password"));
    assert_eq!(state.storage.token(), None);
}

#[tokio::test]
async fn unreadable_issued_token_is_not_stored() {
    let base = backend().await;
    let (state, _) = client_state(&base, memory_storage(None));

    let err = state.session.login("broken@corp.vn", "x").await.unwrap_err();

    assert!(matches!(err, ApiError::Token(_)));
    assert_eq!(state.storage.token(), None);
}

#[tokio::test]
async fn expired_stored_token_is_cleared_on_read() {
    let expired = mint_token("old@corp.vn", Role::Admin, None, -60);
    let (state, _) = client_state("http://127.0.0.1:9/api/v1", memory_storage(Some(&expired)));

    assert_eq!(state.session.current_user(), None);
    assert_eq!(state.storage.token(), None);
}

#[tokio::test]
async fn garbage_stored_token_is_cleared_on_read() {
    let (state, _) = client_state("http://127.0.0.1:9/api/v1", memory_storage(Some("abc.def")));

    assert_eq!(state.session.current_user(), None);
    assert_eq!(state.storage.token(), None);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let token = valid_token(Role::Employee, Some(11));
    let (state, _) = client_state("http://127.0.0.1:9/api/v1", memory_storage(Some(&token)));

    state.session.logout();
    state.session.logout();

    assert_eq!(state.storage.token(), None);
    assert_eq!(state.session.current_user(), None);
}

#[tokio::test]
async fn later_login_wins() {
    let base = backend().await;
    let (state, _) = client_state(&base, memory_storage(None));

    state.session.login("hr@corp.vn", "secret").await.unwrap();
    state.session.login("payroll@corp.vn", "secret").await.unwrap();

    let user = state.session.current_user().unwrap();
    assert_eq!(user.email, "payroll@corp.vn");
    assert_eq!(user.role, Role::PayrollManager);
}

// --- Auth Context ---

#[tokio::test]
async fn context_starts_from_the_persisted_token() {
    let token = valid_token(Role::PayrollManager, None);
    let (state, _) = client_state("http://127.0.0.1:9/api/v1", memory_storage(Some(&token)));

    let user = state.auth.current_user().unwrap();
    assert_eq!(user.role, Role::PayrollManager);
    assert!(state.auth.is_authenticated());
}

#[tokio::test]
async fn subscribers_observe_login_and_logout() {
    let base = backend().await;
    let (state, _) = client_state(&base, memory_storage(None));
    let mut watcher = state.auth.subscribe();
    assert!(watcher.borrow_and_update().is_none());

    state.auth.login("hr@corp.vn", "secret").await.unwrap();
    assert!(watcher.has_changed().unwrap());
    assert_eq!(
        watcher.borrow_and_update().as_ref().map(|u| u.role),
        Some(Role::HrManager)
    );

    state.auth.logout();
    assert!(watcher.has_changed().unwrap());
    assert!(watcher.borrow_and_update().is_none());
    assert_eq!(state.storage.token(), None);
}

#[tokio::test]
async fn failed_login_resets_context_and_propagates() {
    let base = backend().await;
    let token = valid_token(Role::Admin, None);
    let (state, _) = client_state(&base, memory_storage(Some(&token)));

    let err = state.auth.login("hr@corp.vn", "nope").await.unwrap_err();

    assert_eq!(err.detail(), Some("Incorrect email or password"));
    assert_eq!(state.auth.current_user(), None);
}
