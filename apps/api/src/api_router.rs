use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use easyholmes_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout_handler))
        .route("/api/auth/verify", get(handlers::auth::verify_token_handler))
        .route(
            "/api/auth/cache/stats",
            get(handlers::cache::cache_stats_handler),
        )
        .route(
            "/api/auth/cache/clear",
            post(handlers::cache::clear_cache_handler),
        )
        .route(
            "/api/processes",
            get(handlers::processes::list_processes_handler),
        )
        .route(
            "/api/processes/instances",
            get(handlers::processes::list_instances_handler),
        )
        .route(
            "/api/processes/create",
            post(handlers::processes::create_process_handler),
        )
        .route(
            "/api/processes/start",
            post(handlers::processes::start_process_handler),
        )
        .route(
            "/api/processes/clear-cache",
            post(handlers::processes::clear_process_cache_handler),
        )
        .route(
            "/api/processes/refresh",
            post(handlers::processes::refresh_processes_handler),
        )
        .route(
            "/api/processes/{process_id}",
            get(handlers::processes::get_process_handler),
        )
        .route(
            "/api/processes/{process_id}/tasks",
            get(handlers::processes::process_tasks_handler),
        )
        .route(
            "/api/processes/{process_id}/history",
            post(handlers::processes::process_history_handler),
        )
        .route(
            "/api/processes/{process_id}/template",
            get(handlers::processes::process_template_handler),
        )
        .route(
            "/api/processes/{process_id}/invalidate-cache",
            post(handlers::processes::invalidate_process_cache_handler),
        )
        .route("/api/tasks", get(handlers::tasks::list_tasks_handler))
        .route(
            "/api/tasks/status/{status}",
            get(handlers::tasks::tasks_by_status_handler),
        )
        .route(
            "/api/tasks/refresh",
            post(handlers::tasks::refresh_tasks_handler),
        )
        .route("/api/tasks/{task_id}", get(handlers::tasks::get_task_handler))
        .route(
            "/api/tasks/{task_id}/properties",
            get(handlers::tasks::task_properties_handler),
        )
        .route(
            "/api/tasks/{task_id}/status",
            patch(handlers::tasks::update_task_status_handler),
        )
        .route(
            "/api/tasks/{task_id}/complete",
            post(handlers::tasks::complete_task_handler),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/users/{user_id}/change-password",
            post(handlers::users::change_password_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_bearer,
        ));

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route(
            "/api/auth/test-holmes",
            get(handlers::auth::test_holmes_handler),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use axum::response::Response;
    use easyholmes_core::UserRole;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::build_router;
    use crate::handlers::test_support::{TEST_PASSWORD, TestHarness};

    async fn send(harness: &TestHarness, request: Request<Body>) -> Response {
        let router = match build_router(harness.state.clone(), "http://localhost:8080") {
            Ok(router) => router,
            Err(error) => panic!("router should build: {error}"),
        };

        match router.oneshot(request).await {
            Ok(response) => response,
            Err(error) => panic!("router should respond: {error}"),
        }
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        send(&TestHarness::new(), request).await.status()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = match to_bytes(response.into_body(), usize::MAX).await {
            Ok(bytes) => bytes,
            Err(error) => panic!("body should be readable: {error}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(error) => panic!("body should be JSON: {error}"),
        }
    }

    async fn signed_in(harness: &TestHarness) -> String {
        harness
            .seed_user("Ana Lima", "ana@example.com", UserRole::Admin)
            .await;
        match harness
            .state
            .user_service
            .login("ana@example.com", TEST_PASSWORD)
            .await
        {
            Ok(outcome) => format!("Bearer {}", outcome.token.token),
            Err(error) => panic!("seeded user should log in: {error}"),
        }
    }

    fn authorized(method: Method, uri: &str, bearer: &str, body: Body) -> Request<Body> {
        match Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, bearer)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
        {
            Ok(request) => request,
            Err(error) => panic!("request should build: {error}"),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        match Request::builder().uri(uri).body(Body::empty()) {
            Ok(request) => request,
            Err(error) => panic!("request should build: {error}"),
        }
    }

    #[tokio::test]
    async fn protected_routes_require_a_bearer_token() {
        assert_eq!(status_of(get("/api/processes")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(get("/api/users")).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_bearer_token_is_forbidden() {
        let request = match Request::builder()
            .uri("/api/tasks")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(error) => panic!("request should build: {error}"),
        };

        assert_eq!(status_of(request).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn holmes_connection_check_is_public() {
        assert_eq!(status_of(get("/api/auth/test-holmes")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_query_string_uses_the_failure_envelope() {
        let harness = TestHarness::new();
        let bearer = signed_in(&harness).await;

        let response = send(
            &harness,
            authorized(Method::GET, "/api/tasks?limit=abc", &bearer, Body::empty()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error"], "validation_failed");
    }

    #[tokio::test]
    async fn malformed_json_body_uses_the_failure_envelope() {
        let harness = TestHarness::new();
        let bearer = signed_in(&harness).await;

        let response = send(
            &harness,
            authorized(
                Method::PATCH,
                "/api/tasks/T1/status",
                &bearer,
                Body::from("{\"status\": "),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], Value::Bool(false));
        assert_eq!(body["error"], "validation_failed");
        assert!(
            body["message"]
                .as_str()
                .is_some_and(|message| message.starts_with("invalid request body"))
        );
    }
}
