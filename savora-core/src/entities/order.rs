use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// One customer's claim on one unit of an offer.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub customer_user_id: Uuid,
    pub status: OrderStatus,
    pub reserved_until: time::PrimitiveDateTime,
    pub created_at: time::PrimitiveDateTime,
}

/// `Reserved -> {Paid, Expired}`, `Paid -> {NoShow}`; `Expired` and
/// `NoShow` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Reserved,
    Paid,
    Expired,
    NoShow,
}

const ORDER_COLUMNS: &str =
    "id, offer_id, customer_user_id, status, reserved_until, created_at";

#[derive(Debug, Clone)]
pub struct GetOrderById {
    pub order_id: Uuid,
}

impl Processor<GetOrderById> for DatabaseProcessor {
    type Output = Option<Order>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOrderById")]
    async fn process(&self, query: GetOrderById) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(query.order_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Candidate picked up by the sweeper: a reservation past its deadline.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OverdueReservation {
    pub id: Uuid,
    pub offer_id: Uuid,
}

#[derive(Debug, Clone)]
/// Reserved orders whose `reserved_until` has passed, oldest first,
/// bounded so one sweep pass stays small.
pub struct FindOverdueReservations {
    pub now: time::PrimitiveDateTime,
    pub limit: i64,
}

impl Processor<FindOverdueReservations> for DatabaseProcessor {
    type Output = Vec<OverdueReservation>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindOverdueReservations")]
    async fn process(
        &self,
        query: FindOverdueReservations,
    ) -> Result<Vec<OverdueReservation>, sqlx::Error> {
        sqlx::query_as::<_, OverdueReservation>(
            "SELECT id, offer_id FROM orders \
             WHERE status = 'reserved' AND reserved_until < $1 \
             ORDER BY reserved_until ASC LIMIT $2",
        )
        .bind(query.now)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}

/// Candidate for the no-show path: paid, pickup window long over.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OverduePickup {
    pub id: Uuid,
    pub customer_user_id: Uuid,
}

#[derive(Debug, Clone)]
/// Paid orders whose offer's `pickup_end` lies before `cutoff`
/// (`now - grace`), bounded like the reservation batch.
pub struct FindOverduePickups {
    pub cutoff: time::PrimitiveDateTime,
    pub limit: i64,
}

impl Processor<FindOverduePickups> for DatabaseProcessor {
    type Output = Vec<OverduePickup>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindOverduePickups")]
    async fn process(&self, query: FindOverduePickups) -> Result<Vec<OverduePickup>, sqlx::Error> {
        sqlx::query_as::<_, OverduePickup>(
            "SELECT o.id, o.customer_user_id FROM orders o \
             JOIN offers f ON f.id = o.offer_id \
             WHERE o.status = 'paid' AND f.pickup_end < $1 \
             ORDER BY f.pickup_end ASC LIMIT $2",
        )
        .bind(query.cutoff)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}

impl Order {
    pub async fn get_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Insert a fresh reservation; the unit it claims must have been
    /// decremented in the same transaction.
    pub async fn insert_reserved_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
        customer_user_id: Uuid,
        reserved_until: time::PrimitiveDateTime,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (id, offer_id, customer_user_id, status, reserved_until) \
             VALUES ($1, $2, $3, 'reserved', $4) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(offer_id)
        .bind(customer_user_id)
        .bind(reserved_until)
        .fetch_one(&mut **tx)
        .await
    }

    /// `reserved -> paid`. Zero rows means something else got there first;
    /// the caller re-reads and reports the observed status.
    pub async fn mark_paid_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE orders SET status = 'paid' WHERE id = $1 AND status = 'reserved'")
                .bind(order_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }

    /// `reserved -> expired`. Re-checks the deadline at commit time so a
    /// payment landing between the sweeper's read and write wins the race.
    pub async fn expire_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        now: time::PrimitiveDateTime,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'expired' \
             WHERE id = $1 AND status = 'reserved' AND reserved_until < $2",
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// `paid -> no_show`. The unit stays consumed; the strike is recorded
    /// by the caller in the same transaction.
    pub async fn mark_no_show_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE orders SET status = 'no_show' WHERE id = $1 AND status = 'paid'")
                .bind(order_id)
                .execute(&mut **tx)
                .await?;
        Ok(result.rows_affected())
    }
}
