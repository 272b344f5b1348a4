//! HS256 JWT access tokens.
//!
//! The library checks the signature only. Expiry is checked here against
//! `chrono::Utc::now()` with a small clock-skew allowance.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use easyholmes_application::{AccessTokenCodec, IssuedToken};
use easyholmes_core::{AppError, AppResult, UserIdentity, UserRole};

/// Minimum accepted signing secret length in bytes.
pub const JWT_SECRET_MIN_LENGTH: usize = 32;

const CLOCK_SKEW_SECONDS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    email: String,
    name: String,
    role: UserRole,
    iat: i64,
    exp: i64,
}

/// JWT implementation of the access-token port.
#[derive(Clone)]
pub struct JwtAccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl JwtAccessTokenCodec {
    /// Creates a codec signing with `secret`; tokens live for `token_ttl`.
    pub fn new(secret: &str, token_ttl: Duration) -> AppResult<Self> {
        if secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT secret must be at least {JWT_SECRET_MIN_LENGTH} bytes"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_owned(), "sub".to_owned()]);
        validation
    }
}

impl AccessTokenCodec for JwtAccessTokenCodec {
    fn issue(&self, identity: &UserIdentity) -> AppResult<IssuedToken> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.token_ttl;
        let claims = AccessClaims {
            sub: identity.subject().to_owned(),
            email: identity.email().to_owned(),
            name: identity.display_name().to_owned(),
            role: identity.role(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign access token: {error}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> AppResult<UserIdentity> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|error| match error.kind() {
                ErrorKind::InvalidSignature => {
                    AppError::Forbidden("token signature is invalid".to_owned())
                }
                _ => AppError::Forbidden(format!("token is invalid: {error}")),
            })?;

        let claims = data.claims;
        if claims.exp + CLOCK_SKEW_SECONDS < Utc::now().timestamp() {
            return Err(AppError::Forbidden("token has expired".to_owned()));
        }

        Ok(UserIdentity::new(
            claims.sub,
            claims.name,
            claims.email,
            claims.role,
        ))
    }
}
