use async_trait::async_trait;
use chrono::{DateTime, Utc};

use easyholmes_core::{AppResult, UserIdentity, UserRole};
use easyholmes_domain::UserId;

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Canonical (lower-cased) email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
    /// Inactive users cannot log in.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns the identity a token issued for this user carries.
    #[must_use]
    pub fn identity(&self) -> UserIdentity {
        UserIdentity::new(
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role,
        )
    }
}

/// Fields of a user to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Role.
    pub role: UserRole,
}

/// Fields of a user to change; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecordChanges {
    /// New display name.
    pub name: Option<String>,
    /// New canonical email address.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Lists every user, oldest first.
    async fn list(&self) -> AppResult<Vec<UserRecord>>;

    /// Finds a user by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Finds a user by canonical email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Inserts a user.
    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord>;

    /// Applies changes. Returns `None` when the user does not exist.
    async fn update(
        &self,
        user_id: UserId,
        changes: UserRecordChanges,
    ) -> AppResult<Option<UserRecord>>;

    /// Deletes a user. Returns whether a row was removed.
    async fn delete(&self, user_id: UserId) -> AppResult<bool>;
}

/// Port for password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Signed access token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Port for bearer token issuing and verification.
pub trait AccessTokenCodec: Send + Sync {
    /// Issues a token for `identity`.
    fn issue(&self, identity: &UserIdentity) -> AppResult<IssuedToken>;

    /// Verifies a token and returns the identity it carries.
    ///
    /// Invalid, tampered and expired tokens are `AppError::Forbidden`.
    fn verify(&self, token: &str) -> AppResult<UserIdentity>;
}
