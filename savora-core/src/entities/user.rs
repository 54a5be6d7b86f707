use uuid::Uuid;

/// The slice of the user row this crate touches: the self-unblock
/// bookkeeping. Account identity and login live with the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserUnblockState {
    pub id: Uuid,
    pub last_self_unblock_at: Option<time::PrimitiveDateTime>,
}

impl UserUnblockState {
    pub async fn get_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<Option<UserUnblockState>, sqlx::Error> {
        sqlx::query_as::<_, UserUnblockState>(
            "SELECT id, last_self_unblock_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Stamped only when a self-unblock confirmation commits.
    pub async fn set_last_self_unblock_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        at: time::PrimitiveDateTime,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_self_unblock_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(at)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
