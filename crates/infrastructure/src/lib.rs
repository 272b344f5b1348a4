//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod http_holmes_gateway;
mod jwt_access_token_codec;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use http_holmes_gateway::HttpHolmesGateway;
pub use jwt_access_token_codec::{JWT_SECRET_MIN_LENGTH, JwtAccessTokenCodec};
pub use postgres_user_repository::PostgresUserRepository;
