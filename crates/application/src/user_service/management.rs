use tracing::{debug, info};

use easyholmes_domain::{EmailAddress, validate_password, validate_user_name};

use crate::{NewUserRecord, UserRecordChanges};

use super::*;

impl UserService {
    /// Lists every user. Admin only.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<UserRecord>> {
        Self::require_admin(actor, "list users")?;
        self.user_repository.list().await
    }

    /// Returns one user. Admins can read anyone, users only themselves.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserRecord> {
        Self::require_admin_or_self(actor, user_id, "view")?;
        self.existing_user(user_id).await
    }

    /// Creates a user. Admin only.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<UserRecord> {
        Self::require_admin(actor, "create users")?;

        let name = validate_user_name(&input.name)?;
        let email = EmailAddress::new(input.email)?;
        validate_password(&input.password)?;
        self.ensure_email_available(&email, None).await?;

        let password_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .user_repository
            .create(NewUserRecord {
                name,
                email: email.into(),
                password_hash,
                role: input.role.unwrap_or(UserRole::User),
            })
            .await?;

        info!(user_id = %user.id, created_by = actor.subject(), "user created");
        Ok(user)
    }

    /// Updates a user. Admins can update anyone; users only themselves and
    /// never their own role or active flag.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserRecord> {
        Self::require_admin_or_self(actor, user_id, "update")?;
        let existing = self.existing_user(user_id).await?;

        let name = input
            .name
            .as_deref()
            .map(validate_user_name)
            .transpose()?;

        let email = match input.email {
            Some(email) => {
                let email = EmailAddress::new(email)?;
                if email.as_str() != existing.email {
                    self.ensure_email_available(&email, Some(user_id)).await?;
                }
                Some(String::from(email))
            }
            None => None,
        };

        let password_hash = match input.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.password_hasher.hash_password(password)?)
            }
            None => None,
        };

        let (role, is_active) = if actor.is_admin() {
            (input.role, input.is_active)
        } else {
            if input.role.is_some() || input.is_active.is_some() {
                debug!(user_id = %user_id, "ignoring role/is_active change from non-admin");
            }
            (None, None)
        };

        let updated = self
            .user_repository
            .update(
                user_id,
                UserRecordChanges {
                    name,
                    email,
                    password_hash,
                    role,
                    is_active,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        info!(user_id = %user_id, updated_by = actor.subject(), "user updated");
        Ok(updated)
    }

    /// Deletes a user. Admin only; nobody can delete their own account.
    pub async fn delete_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        Self::require_admin(actor, "delete users")?;
        if actor.subject() == user_id.to_string() {
            return Err(AppError::Validation(
                "you cannot delete your own account".to_owned(),
            ));
        }

        self.existing_user(user_id).await?;
        if !self.user_repository.delete(user_id).await? {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        info!(user_id = %user_id, deleted_by = actor.subject(), "user deleted");
        Ok(())
    }

    /// Creates the bootstrap admin when no user holds `email` yet.
    ///
    /// Returns whether a user was created.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> AppResult<bool> {
        let email = EmailAddress::new(email)?;
        if self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let name = validate_user_name(name)?;
        validate_password(password)?;
        let password_hash = self.password_hasher.hash_password(password)?;
        let user = self
            .user_repository
            .create(NewUserRecord {
                name,
                email: email.into(),
                password_hash,
                role: UserRole::Admin,
            })
            .await?;

        info!(user_id = %user.id, "bootstrap admin created");
        Ok(true)
    }

    async fn ensure_email_available(
        &self,
        email: &EmailAddress,
        owner: Option<UserId>,
    ) -> AppResult<()> {
        let taken = self
            .user_repository
            .find_by_email(email.as_str())
            .await?
            .is_some_and(|user| Some(user.id) != owner);

        if taken {
            return Err(AppError::Validation(
                "a user with this email already exists".to_owned(),
            ));
        }
        Ok(())
    }
}
