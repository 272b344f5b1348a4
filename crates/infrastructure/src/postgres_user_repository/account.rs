use super::*;

impl PostgresUserRepository {
    pub(super) async fn create_impl(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, LOWER($3), $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new().as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create user"))?;

        UserRecord::try_from(row)
    }

    pub(super) async fn update_impl(
        &self,
        user_id: UserId,
        changes: UserRecordChanges,
    ) -> AppResult<Option<UserRecord>> {
        // NULL parameters keep the current column value.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE(LOWER($3), email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.role.map(UserRole::as_str))
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "update user"))?;

        row.map(UserRecord::try_from).transpose()
    }

    pub(super) async fn delete_impl(&self, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete user: {error}")))?;

        Ok(result.rows_affected() > 0)
    }
}
