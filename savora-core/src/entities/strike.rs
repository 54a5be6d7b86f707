use uuid::Uuid;

/// A recorded penalty event. Strikes are never deleted; losing standing is
/// expressed through `is_active` alone.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Strike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reason: StrikeReason,
    pub is_active: bool,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "strike_reason", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrikeReason {
    NoShow,
    Manual,
}

impl Strike {
    /// Append one active no-show strike. Called only from the sweeper's
    /// `paid -> no_show` transition, inside the same transaction.
    pub async fn record_no_show_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO strikes (id, user_id, reason, is_active) \
             VALUES ($1, $2, 'no_show', TRUE)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// A customer's currently active no-show strike ids, newest first.
    /// Used to pick the ids to keep active during self-unblock.
    pub async fn active_no_show_ids_newest_first_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM strikes \
             WHERE user_id = $1 AND reason = 'no_show' AND is_active \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Rewrite the active set of a customer's no-show strikes in one
    /// statement: kept ids become active, every other no-show strike is
    /// deactivated. Strikes with other reasons are untouched.
    pub async fn retain_active_no_show_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        keep_ids: &[Uuid],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE strikes SET is_active = (id = ANY($2)) \
             WHERE user_id = $1 AND reason = 'no_show'",
        )
        .bind(user_id)
        .bind(keep_ids)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
