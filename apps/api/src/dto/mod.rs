mod auth;
mod cache;
mod common;
mod processes;
mod tasks;
mod users;

pub use auth::{
    AuthLoginRequest, AuthLoginResponse, AuthUserResponse, ConnectionCheckResponse,
    VerifyTokenResponse,
};
pub use cache::{CacheInvalidationResponse, CacheStatsResponse};
pub use common::{ApiResponse, HealthDependencyStatus, HealthResponse};
pub use processes::{CreateProcessRequest, ProcessHistoryRequest, StartProcessRequest};
pub use tasks::{
    CompleteTaskRequest, TaskListQuery, TaskPageResponse, TaskResponse, UpdateTaskStatusRequest,
};
pub use users::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest, UserResponse};
