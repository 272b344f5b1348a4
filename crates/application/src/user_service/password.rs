use tracing::info;

use easyholmes_domain::validate_password;

use crate::UserRecordChanges;

use super::*;

impl UserService {
    /// Changes a user's password.
    ///
    /// Admins can reset anyone's password. Users can change only their own and
    /// must present the current one.
    pub async fn change_password(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: ChangePasswordInput,
    ) -> AppResult<()> {
        Self::require_admin_or_self(actor, user_id, "change the password of")?;
        let existing = self.existing_user(user_id).await?;

        if !actor.is_admin() {
            let current = input.current_password.as_deref().unwrap_or_default();
            if current.is_empty()
                || !self
                    .password_hasher
                    .verify_password(current, &existing.password_hash)?
            {
                return Err(AppError::Validation(
                    "current password is incorrect".to_owned(),
                ));
            }
        }

        validate_password(&input.new_password)?;
        let password_hash = self.password_hasher.hash_password(&input.new_password)?;
        self.user_repository
            .update(
                user_id,
                UserRecordChanges {
                    password_hash: Some(password_hash),
                    ..UserRecordChanges::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        info!(user_id = %user_id, changed_by = actor.subject(), "password changed");
        Ok(())
    }
}
