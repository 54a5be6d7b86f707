use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// One self-unblock attempt: a tracked bank-transfer of the penalty fee.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PenaltyPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i32,
    pub currency: String,
    pub reference: String,
    pub status: PenaltyStatus,
    pub expires_at: time::PrimitiveDateTime,
    pub bank_txn_ref: Option<String>,
    pub created_at: time::PrimitiveDateTime,
}

/// `Initiated -> PendingVerification -> Confirmed`; any non-terminal state
/// can fall to `Expired` by clock; `Rejected` comes from an admin decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "penalty_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenaltyStatus {
    Initiated,
    PendingVerification,
    Confirmed,
    Rejected,
    Expired,
}

const PENALTY_COLUMNS: &str = "id, user_id, amount_cents, currency, reference, status, \
     expires_at, bank_txn_ref, created_at";

#[derive(Debug, Clone)]
pub struct GetPenaltyPaymentById {
    pub payment_id: Uuid,
}

impl Processor<GetPenaltyPaymentById> for DatabaseProcessor {
    type Output = Option<PenaltyPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPenaltyPaymentById")]
    async fn process(
        &self,
        query: GetPenaltyPaymentById,
    ) -> Result<Option<PenaltyPayment>, sqlx::Error> {
        sqlx::query_as::<_, PenaltyPayment>(&format!(
            "SELECT {PENALTY_COLUMNS} FROM penalty_payments WHERE id = $1"
        ))
        .bind(query.payment_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// The customer's most recent confirmed attempt, if any — the anchor for
/// the cooldown window.
pub struct GetLastConfirmedPenaltyPayment {
    pub user_id: Uuid,
}

impl Processor<GetLastConfirmedPenaltyPayment> for DatabaseProcessor {
    type Output = Option<PenaltyPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetLastConfirmedPenaltyPayment")]
    async fn process(
        &self,
        query: GetLastConfirmedPenaltyPayment,
    ) -> Result<Option<PenaltyPayment>, sqlx::Error> {
        sqlx::query_as::<_, PenaltyPayment>(&format!(
            "SELECT {PENALTY_COLUMNS} FROM penalty_payments \
             WHERE user_id = $1 AND status = 'confirmed' \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(query.user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct InsertPenaltyPayment {
    pub user_id: Uuid,
    pub amount_cents: i32,
    pub currency: String,
    pub reference: String,
    pub expires_at: time::PrimitiveDateTime,
}

impl Processor<InsertPenaltyPayment> for DatabaseProcessor {
    type Output = PenaltyPayment;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertPenaltyPayment")]
    async fn process(&self, insert: InsertPenaltyPayment) -> Result<PenaltyPayment, sqlx::Error> {
        sqlx::query_as::<_, PenaltyPayment>(&format!(
            "INSERT INTO penalty_payments \
             (id, user_id, amount_cents, currency, reference, status, expires_at) \
             VALUES ($1, $2, $3, $4, $5, 'initiated', $6) \
             RETURNING {PENALTY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(insert.user_id)
        .bind(insert.amount_cents)
        .bind(insert.currency)
        .bind(insert.reference)
        .bind(insert.expires_at)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Move a payment to `pending_verification` after the customer submits
/// transfer proof. Deliberately carries no current-state guard: this
/// mirrors the flow's observed behavior, where proof can re-open a
/// terminal payment (see DESIGN.md).
pub struct MarkPenaltyProof {
    pub payment_id: Uuid,
}

impl Processor<MarkPenaltyProof> for DatabaseProcessor {
    type Output = Option<PenaltyPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkPenaltyProof")]
    async fn process(&self, cmd: MarkPenaltyProof) -> Result<Option<PenaltyPayment>, sqlx::Error> {
        sqlx::query_as::<_, PenaltyPayment>(&format!(
            "UPDATE penalty_payments SET status = 'pending_verification' \
             WHERE id = $1 RETURNING {PENALTY_COLUMNS}"
        ))
        .bind(cmd.payment_id)
        .fetch_optional(&self.pool)
        .await
    }
}

impl PenaltyPayment {
    pub async fn get_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<Option<PenaltyPayment>, sqlx::Error> {
        sqlx::query_as::<_, PenaltyPayment>(&format!(
            "SELECT {PENALTY_COLUMNS} FROM penalty_payments WHERE id = $1"
        ))
        .bind(payment_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Force a payment whose `expires_at` has passed into `expired`.
    pub async fn force_expire_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE penalty_payments SET status = 'expired' WHERE id = $1")
                .bind(payment_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }

    /// The confirming conditional update: only wins while the row is still
    /// `pending_verification`. Zero rows means a concurrent confirmer (or
    /// the clock) got there first and the caller must re-classify.
    pub async fn confirm_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        payment_id: Uuid,
        bank_txn_ref: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE penalty_payments SET status = 'confirmed', bank_txn_ref = $2 \
             WHERE id = $1 AND status = 'pending_verification'",
        )
        .bind(payment_id)
        .bind(bank_txn_ref)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
