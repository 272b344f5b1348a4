use easyholmes_application::{ConnectionCheck, LoginOutcome};
use easyholmes_core::UserIdentity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Incoming payload for email/password login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticated user as the frontend sees it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-user-response.ts"
)]
pub struct AuthUserResponse {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}

impl From<&UserIdentity> for AuthUserResponse {
    fn from(identity: &UserIdentity) -> Self {
        Self {
            id: identity.subject().to_owned(),
            email: identity.email().to_owned(),
            role: identity.role().as_str().to_owned(),
            name: identity.display_name().to_owned(),
        }
    }
}

/// Issued token and the user it belongs to.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-response.ts"
)]
pub struct AuthLoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: AuthUserResponse,
}

impl From<LoginOutcome> for AuthLoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token.token,
            expires_at: outcome.token.expires_at.to_rfc3339(),
            user: AuthUserResponse::from(&outcome.user.identity()),
        }
    }
}

/// Claims echoed back by token verification.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/verify-token-response.ts"
)]
pub struct VerifyTokenResponse {
    pub user: AuthUserResponse,
}

/// Result of the Holmes connection check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/connection-check-response.ts"
)]
pub struct ConnectionCheckResponse {
    #[serde(rename = "processesCount")]
    pub processes_count: usize,
    #[serde(rename = "sampleProcess")]
    #[ts(type = "unknown | null")]
    pub sample_process: Option<Value>,
}

impl From<ConnectionCheck> for ConnectionCheckResponse {
    fn from(check: ConnectionCheck) -> Self {
        Self {
            processes_count: check.processes_count,
            sample_process: check
                .sample_process
                .and_then(|process| serde_json::to_value(process).ok()),
        }
    }
}
