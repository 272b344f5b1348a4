use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use easyholmes_core::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Requires a valid bearer token and stores the decoded identity as a request
/// extension.
///
/// A missing token is `401`; a token that fails verification is `403`.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers().get(header::AUTHORIZATION))
        .ok_or_else(|| AppError::Unauthorized("access token is required".to_owned()))?;

    let identity = state.user_service.verify_token(token)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn bearer_token(value: Option<&header::HeaderValue>) -> Option<&str> {
    let value = value?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
