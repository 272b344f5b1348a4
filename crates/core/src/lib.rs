//! Shared primitives for all Rust crates in EasyHolmes.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{UserIdentity, UserRole};

/// Result type used across EasyHolmes crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Validates a required request field, naming it in the error.
    pub fn required(field: &str, value: impl Into<String>) -> AppResult<Self> {
        Self::new(value).map_err(|_| AppError::Validation(format!("{field} is required")))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// User is not authenticated or presented unusable credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by policy or by the remote system.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A remote Holmes operation failed (transport, timeout or rejected status).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn required_field_error_names_the_field() {
        let missing = NonEmptyString::required("workflowId", " \t");
        assert!(matches!(
            missing,
            Err(AppError::Validation(ref message)) if message == "workflowId is required"
        ));

        let present = NonEmptyString::required("workflowId", "W1").map(String::from);
        assert_eq!(present.ok().as_deref(), Some("W1"));
    }

    #[test]
    fn upstream_error_names_the_operation() {
        let error = AppError::Upstream("failed to fetch processes from Holmes".to_owned());
        assert_eq!(
            error.to_string(),
            "upstream error: failed to fetch processes from Holmes"
        );
    }
}
