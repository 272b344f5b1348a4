use easyholmes_application::{ChangePasswordInput, CreateUserInput, UpdateUserInput, UserRecord};
use easyholmes_core::{AppError, AppResult, UserRole};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// User account without its password hash.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    #[ts(optional)]
    pub role: Option<String>,
}

impl TryFrom<CreateUserRequest> for CreateUserInput {
    type Error = AppError;

    fn try_from(request: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            email: request.email,
            password: request.password,
            role: parse_role(request.role)?,
        })
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub password: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub role: Option<String>,
    #[serde(default, alias = "isActive")]
    #[ts(optional)]
    pub is_active: Option<bool>,
}

impl TryFrom<UpdateUserRequest> for UpdateUserInput {
    type Error = AppError;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            email: request.email,
            password: request.password.filter(|password| !password.is_empty()),
            role: parse_role(request.role)?,
            is_active: request.is_active,
        })
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-password-request.ts"
)]
pub struct ChangePasswordRequest {
    #[serde(default, rename = "currentPassword", alias = "current_password")]
    #[ts(optional)]
    pub current_password: Option<String>,
    #[serde(default, rename = "newPassword", alias = "new_password")]
    pub new_password: String,
}

impl From<ChangePasswordRequest> for ChangePasswordInput {
    fn from(request: ChangePasswordRequest) -> Self {
        Self {
            current_password: request.current_password,
            new_password: request.new_password,
        }
    }
}

fn parse_role(role: Option<String>) -> AppResult<Option<UserRole>> {
    role.as_deref()
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::parse::<UserRole>)
        .transpose()
}
