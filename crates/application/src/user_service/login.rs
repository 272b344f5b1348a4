use tracing::{info, warn};

use easyholmes_domain::EmailAddress;

use super::*;

const INVALID_CREDENTIALS: &str = "invalid email or password";

impl UserService {
    /// Authenticates a user with email and password and issues a token.
    ///
    /// Unknown emails, wrong passwords and inactive accounts all fail with the
    /// same `Unauthorized` error.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let email = EmailAddress::new(email)?;

        let Some(user) = self.user_repository.find_by_email(email.as_str()).await? else {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self
            .password_hasher
            .verify_password(password, &user.password_hash)?
        {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        if !user.is_active {
            warn!(user_id = %user.id, "login rejected: inactive account");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let token = self.token_codec.issue(&user.identity())?;
        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome { token, user })
    }

    /// Verifies a bearer token.
    pub fn verify_token(&self, token: &str) -> AppResult<UserIdentity> {
        self.token_codec.verify(token)
    }
}
