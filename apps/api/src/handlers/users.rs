use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use easyholmes_core::UserIdentity;
use easyholmes_domain::UserId;

use crate::dto::{
    ApiResponse, ChangePasswordRequest, CreateUserRequest, UpdateUserRequest, UserResponse,
};
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;


pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state
        .user_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(ApiResponse::data(users)))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user_id = UserId::parse(&user_id)?;
    let found = state.user_service.get_user(&user, user_id).await?;
    Ok(Json(ApiResponse::data(UserResponse::from(found))))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let created = state
        .user_service
        .create_user(&user, payload.try_into()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(UserResponse::from(created)).with_message("user created")),
    ))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user_id = UserId::parse(&user_id)?;
    let updated = state
        .user_service
        .update_user(&user, user_id, payload.try_into()?)
        .await?;

    Ok(Json(
        ApiResponse::data(UserResponse::from(updated)).with_message("user updated"),
    ))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user_id = UserId::parse(&user_id)?;
    state.user_service.delete_user(&user, user_id).await?;
    Ok(Json(ApiResponse::message("user deleted")))
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user_id = UserId::parse(&user_id)?;
    state
        .user_service
        .change_password(&user, user_id, payload.into())
        .await?;

    Ok(Json(ApiResponse::message("password changed")))
}
