//! Local user accounts and bearer-token authentication.
//!
//! Owns login, token verification and the admin/self permission rules of
//! user management. Login failures share one generic message so callers
//! cannot discover which emails exist.

mod login;
mod management;
mod password;


use std::sync::Arc;

use easyholmes_core::{AppError, AppResult, UserIdentity, UserRole};
use easyholmes_domain::UserId;

use crate::{AccessTokenCodec, IssuedToken, PasswordHasher, UserRecord, UserRepository};

/// Parameters for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Role; `user` when absent.
    pub role: Option<UserRole>,
}

/// Parameters for updating a user; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Display name.
    pub name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
    /// Role. Applied for admins only.
    pub role: Option<UserRole>,
    /// Active flag. Applied for admins only.
    pub is_active: Option<bool>,
}

/// Parameters for a password change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePasswordInput {
    /// Current password. Required unless the actor is an admin.
    pub current_password: Option<String>,
    /// New plaintext password.
    pub new_password: String,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Issued bearer token.
    pub token: IssuedToken,
    /// Authenticated user.
    pub user: UserRecord,
}

/// Application service for users and authentication.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_codec: Arc<dyn AccessTokenCodec>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_codec: Arc<dyn AccessTokenCodec>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_codec,
        }
    }

    fn require_admin(actor: &UserIdentity, action: &str) -> AppResult<()> {
        if actor.is_admin() {
            return Ok(());
        }
        Err(AppError::Forbidden(format!("only administrators can {action}")))
    }

    fn require_admin_or_self(actor: &UserIdentity, user_id: UserId, action: &str) -> AppResult<()> {
        if actor.is_admin() || actor.subject() == user_id.to_string() {
            return Ok(());
        }
        Err(AppError::Forbidden(format!("you can only {action} your own account")))
    }

    async fn existing_user(&self, user_id: UserId) -> AppResult<UserRecord> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }
}
