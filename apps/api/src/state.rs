use easyholmes_application::{HolmesService, TaskAggregator, UserService};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub holmes_service: HolmesService,
    pub task_aggregator: TaskAggregator,
    pub user_service: UserService,
    pub postgres_pool: PgPool,
}
