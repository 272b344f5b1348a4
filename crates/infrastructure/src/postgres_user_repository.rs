//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use easyholmes_application::{NewUserRecord, UserRecord, UserRecordChanges, UserRepository};
use easyholmes_core::{AppError, AppResult, UserRole};
use easyholmes_domain::UserId;

mod account;
mod lookup;


const USER_COLUMNS: &str = "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<UserRole>().map_err(|error| {
            AppError::Internal(format!("user '{}' has an unknown role: {error}", row.id))
        })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list(&self) -> AppResult<Vec<UserRecord>> {
        self.list_impl().await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        self.create_impl(user).await
    }

    async fn update(
        &self,
        user_id: UserId,
        changes: UserRecordChanges,
    ) -> AppResult<Option<UserRecord>> {
        self.update_impl(user_id, changes).await
    }

    async fn delete(&self, user_id: UserId) -> AppResult<bool> {
        self.delete_impl(user_id).await
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Validation("a user with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
