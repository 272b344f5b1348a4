use std::sync::Arc;

use chrono::Duration;
use easyholmes_application::UserService;
use easyholmes_core::AppError;
use easyholmes_infrastructure::{
    Argon2PasswordHasher, JwtAccessTokenCodec, PostgresUserRepository,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;

const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

pub(super) fn build_user_service(pool: &PgPool, config: &ApiConfig) -> Result<UserService, AppError> {
    let token_codec = JwtAccessTokenCodec::new(
        &config.jwt_secret,
        Duration::hours(ACCESS_TOKEN_TTL_HOURS),
    )?;

    Ok(UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(token_codec),
    ))
}
