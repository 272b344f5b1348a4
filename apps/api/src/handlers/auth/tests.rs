use axum::Json;
use axum::extract::{Extension, State};
use easyholmes_core::{AppError, UserRole};

use super::{login_handler, test_holmes_handler, verify_token_handler};
use crate::dto::AuthLoginRequest;
use crate::extract::ApiJson;
use crate::handlers::test_support::{TEST_PASSWORD, TestHarness};

fn login_request(email: &str, password: &str) -> ApiJson<AuthLoginRequest> {
    ApiJson(AuthLoginRequest {
        email: email.to_owned(),
        password: password.to_owned(),
    })
}

#[tokio::test]
async fn login_issues_a_token_the_service_accepts() {
    let harness = TestHarness::new();
    let identity = harness
        .seed_user("Ana Lima", "ana@example.com", UserRole::Admin)
        .await;

    let response = login_handler(
        State(harness.state.clone()),
        login_request("ANA@example.com", TEST_PASSWORD),
    )
    .await;
    let Ok(Json(body)) = response else {
        panic!("login should succeed");
    };
    let Some(data) = body.data else {
        panic!("login response should carry data");
    };

    assert!(body.success);
    assert_eq!(data.user.id, identity.subject());
    assert_eq!(data.user.role, "admin");

    let verified = harness.state.user_service.verify_token(&data.token);
    assert!(matches!(verified, Ok(ref user) if user == &identity));
}

#[tokio::test]
async fn login_failures_are_generic_unauthorized() {
    let harness = TestHarness::new();
    harness
        .seed_user("Ana Lima", "ana@example.com", UserRole::User)
        .await;

    let wrong_password = login_handler(
        State(harness.state.clone()),
        login_request("ana@example.com", "not-the-password"),
    )
    .await;
    let unknown_email = login_handler(
        State(harness.state.clone()),
        login_request("nobody@example.com", TEST_PASSWORD),
    )
    .await;

    for result in [wrong_password, unknown_email] {
        assert!(matches!(
            result,
            Err(ref error) if matches!(&error.0, AppError::Unauthorized(message) if message == "invalid email or password")
        ));
    }
}

#[tokio::test]
async fn login_requires_both_fields() {
    let harness = TestHarness::new();

    let result = login_handler(State(harness.state.clone()), login_request("", "")).await;

    assert!(matches!(result, Err(ref error) if matches!(error.0, AppError::Validation(_))));
}

#[tokio::test]
async fn verify_echoes_the_token_claims() {
    let harness = TestHarness::new();
    let identity = harness
        .seed_user("Bruno", "bruno@example.com", UserRole::User)
        .await;

    let Json(body) = verify_token_handler(Extension(identity.clone())).await;

    let Some(data) = body.data else {
        panic!("verify response should carry data");
    };
    assert_eq!(data.user.email, "bruno@example.com");
    assert_eq!(data.user.name, "Bruno");
    assert_eq!(data.user.role, "user");
}

#[tokio::test]
async fn holmes_connection_check_reports_process_count() {
    let harness = TestHarness::new();
    harness
        .holmes
        .add_process("P1", "Auditoria BIM", "AB-1", "opened")
        .await;

    let result = test_holmes_handler(State(harness.state.clone())).await;
    let Ok(Json(body)) = result else {
        panic!("connection check should succeed");
    };

    let Some(data) = body.data else {
        panic!("connection check should carry data");
    };
    assert_eq!(data.processes_count, 1);
    assert!(data.sample_process.is_some());
}
