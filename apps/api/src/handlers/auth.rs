use axum::Json;
use axum::extract::{Extension, State};
use easyholmes_core::{AppError, UserIdentity};
use tracing::info;

use crate::dto::{
    ApiResponse, AuthLoginRequest, AuthLoginResponse, AuthUserResponse, ConnectionCheckResponse,
    VerifyTokenResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AuthLoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthLoginResponse>>> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("email and password are required".to_owned()).into());
    }

    let outcome = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(
        ApiResponse::data(AuthLoginResponse::from(outcome)).with_message("login successful"),
    ))
}

/// Tokens are stateless; logout only tells the client to drop its copy.
pub async fn logout_handler(
    Extension(user): Extension<UserIdentity>,
) -> Json<ApiResponse<()>> {
    info!(subject = user.subject(), "user logged out");
    Json(ApiResponse::message("logout successful"))
}

pub async fn verify_token_handler(
    Extension(user): Extension<UserIdentity>,
) -> Json<ApiResponse<VerifyTokenResponse>> {
    Json(ApiResponse::data(VerifyTokenResponse {
        user: AuthUserResponse::from(&user),
    }))
}

pub async fn test_holmes_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ConnectionCheckResponse>>> {
    let check = state.holmes_service.check_connection().await?;

    Ok(Json(
        ApiResponse::data(ConnectionCheckResponse::from(check))
            .with_message("Holmes connection succeeded"),
    ))
}
