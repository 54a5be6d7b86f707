use uuid::Uuid;

/// Capture record for an order. The only provider is the mock one, which
/// settles immediately; real gateways are a non-goal.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: PaymentStatus,
    pub provider: String,
    pub provider_ref: String,
    pub amount_cents: i32,
    pub currency: String,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Succeeded,
}

impl Payment {
    /// One capture row per order; retried mock captures overwrite the
    /// provider reference instead of stacking rows.
    pub async fn upsert_succeeded_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        provider_ref: &str,
        amount_cents: i32,
        currency: &str,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            "INSERT INTO payments (id, order_id, status, provider, provider_ref, amount_cents, currency) \
             VALUES ($1, $2, 'succeeded', 'mock', $3, $4, $5) \
             ON CONFLICT (order_id) DO UPDATE \
             SET status = 'succeeded', provider_ref = EXCLUDED.provider_ref \
             RETURNING id, order_id, status, provider, provider_ref, amount_cents, currency, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(order_id)
        .bind(provider_ref)
        .bind(amount_cents)
        .bind(currency)
        .fetch_one(&mut **tx)
        .await
    }
}
