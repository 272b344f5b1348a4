//! Application services and ports.

#![forbid(unsafe_code)]

mod holmes_ports;
mod holmes_service;
mod response_cache;
mod task_aggregator;
mod user_ports;
mod user_service;

#[cfg(test)]
mod testing;

pub use holmes_ports::HolmesGateway;
pub use holmes_service::{
    CompleteTaskInput, ConnectionCheck, CreateProcessInput, HolmesCatalogSettings, HolmesService,
    ProcessView, TaskPropertyView,
};
pub use response_cache::{
    CacheCategory, CacheKey, CacheScope, CacheStats, CacheTtlPolicy, ResponseCache,
};
pub use task_aggregator::{
    AggregationSettings, ProcessContext, TaskAggregator, TaskPage, TaskQuery, fold_history,
};
pub use user_ports::{
    AccessTokenCodec, IssuedToken, NewUserRecord, PasswordHasher, UserRecord, UserRecordChanges,
    UserRepository,
};
pub use user_service::{
    ChangePasswordInput, CreateUserInput, LoginOutcome, UpdateUserInput, UserService,
};
