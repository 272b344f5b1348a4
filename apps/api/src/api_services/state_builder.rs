use easyholmes_core::AppError;
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod holmes;
mod users;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let holmes_services = holmes::build_holmes_services(config)?;
    let user_service = users::build_user_service(&pool, config)?;

    Ok(AppState {
        holmes_service: holmes_services.holmes_service,
        task_aggregator: holmes_services.task_aggregator,
        user_service,
        postgres_pool: pool,
    })
}

/// Seeds the configured admin account when it does not exist yet.
pub async fn ensure_bootstrap_admin(state: &AppState, config: &ApiConfig) -> Result<(), AppError> {
    let Some(admin) = config.bootstrap_admin.as_ref() else {
        return Ok(());
    };

    let created = state
        .user_service
        .ensure_admin(&admin.name, &admin.email, &admin.password)
        .await?;
    if created {
        info!(email = %admin.email, "bootstrap admin account created");
    }

    Ok(())
}
