use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A vendor's sellable unit with bounded quantity and a pickup window.
///
/// Invariant: `0 <= qty_available <= qty_total`, and
/// `qty_total - qty_available` equals the number of orders on this offer
/// still holding a unit (reserved or paid).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub status: OfferStatus,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub qty_total: i32,
    pub qty_available: i32,
    pub pickup_start: time::PrimitiveDateTime,
    pub pickup_end: time::PrimitiveDateTime,
    pub created_at: time::PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "offer_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Draft,
    Live,
    Paused,
    Expired,
    Archived,
}

impl OfferStatus {
    /// Vendor edits are only allowed while the offer is still in play.
    pub fn is_editable(self) -> bool {
        matches!(self, OfferStatus::Draft | OfferStatus::Live | OfferStatus::Paused)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OfferPrice {
    pub price_cents: i32,
    pub currency: String,
}

const OFFER_COLUMNS: &str = "id, vendor_id, status, title, description, price_cents, currency, \
     qty_total, qty_available, pickup_start, pickup_end, created_at";

#[derive(Debug, Clone)]
pub struct GetOfferById {
    pub offer_id: Uuid,
}

impl Processor<GetOfferById> for DatabaseProcessor {
    type Output = Option<Offer>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetOfferById")]
    async fn process(&self, query: GetOfferById) -> Result<Option<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(query.offer_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Create a new offer in `draft` with the full capacity available.
pub struct InsertOffer {
    pub vendor_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub qty_total: i32,
    pub pickup_start: time::PrimitiveDateTime,
    pub pickup_end: time::PrimitiveDateTime,
}

impl Processor<InsertOffer> for DatabaseProcessor {
    type Output = Offer;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertOffer")]
    async fn process(&self, insert: InsertOffer) -> Result<Offer, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "INSERT INTO offers \
             (id, vendor_id, status, title, description, price_cents, currency, \
              qty_total, qty_available, pickup_start, pickup_end) \
             VALUES ($1, $2, 'draft', $3, $4, $5, $6, $7, $7, $8, $9) \
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(insert.vendor_id)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.price_cents)
        .bind(insert.currency)
        .bind(insert.qty_total)
        .bind(insert.pickup_start)
        .bind(insert.pickup_end)
        .fetch_one(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
pub struct ListVendorOffers {
    pub vendor_id: Uuid,
    pub limit: i64,
}

impl Processor<ListVendorOffers> for DatabaseProcessor {
    type Output = Vec<Offer>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListVendorOffers")]
    async fn process(&self, query: ListVendorOffers) -> Result<Vec<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers \
             WHERE vendor_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(query.vendor_id)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone, Default)]
/// Partial field edit. `None` leaves a column untouched; the capacity
/// baseline is changed through [`UpdateOfferCapacity`] instead.
pub struct UpdateOfferDetails {
    pub offer_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub pickup_start: Option<time::PrimitiveDateTime>,
    pub pickup_end: Option<time::PrimitiveDateTime>,
}

impl Processor<UpdateOfferDetails> for DatabaseProcessor {
    type Output = Option<Offer>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateOfferDetails")]
    async fn process(&self, update: UpdateOfferDetails) -> Result<Option<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "UPDATE offers SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             price_cents = COALESCE($4, price_cents), \
             currency = COALESCE($5, currency), \
             pickup_start = COALESCE($6, pickup_start), \
             pickup_end = COALESCE($7, pickup_end) \
             WHERE id = $1 \
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(update.offer_id)
        .bind(update.title)
        .bind(update.description)
        .bind(update.price_cents)
        .bind(update.currency)
        .bind(update.pickup_start)
        .bind(update.pickup_end)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Change `qty_total` while preserving the reserved count.
///
/// The reserved floor (`qty_total - qty_available`) is computed inside the
/// UPDATE itself so a reservation landing between read and write cannot
/// slip under the new total: the predicate simply stops matching and zero
/// rows come back. The caller re-reads to classify.
pub struct UpdateOfferCapacity {
    pub offer_id: Uuid,
    pub new_total: i32,
}

impl Processor<UpdateOfferCapacity> for DatabaseProcessor {
    type Output = Option<Offer>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateOfferCapacity")]
    async fn process(&self, update: UpdateOfferCapacity) -> Result<Option<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "UPDATE offers \
             SET qty_total = $2, \
                 qty_available = $2 - (qty_total - qty_available) \
             WHERE id = $1 AND qty_total - qty_available <= $2 \
             RETURNING {OFFER_COLUMNS}"
        ))
        .bind(update.offer_id)
        .bind(update.new_total)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Put an offer live. Guarded on stock and the pickup window still being
/// open; returns the number of rows that actually flipped.
pub struct PublishOffer {
    pub offer_id: Uuid,
    pub now: time::PrimitiveDateTime,
}

impl Processor<PublishOffer> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:PublishOffer")]
    async fn process(&self, cmd: PublishOffer) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET status = 'live' \
             WHERE id = $1 AND qty_available > 0 AND pickup_end > $2",
        )
        .bind(cmd.offer_id)
        .bind(cmd.now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct PauseOffer {
    pub offer_id: Uuid,
}

impl Processor<PauseOffer> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:PauseOffer")]
    async fn process(&self, cmd: PauseOffer) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE offers SET status = 'paused' WHERE id = $1 AND status = 'live'")
            .bind(cmd.offer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct ResumeOffer {
    pub offer_id: Uuid,
    pub now: time::PrimitiveDateTime,
}

impl Processor<ResumeOffer> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ResumeOffer")]
    async fn process(&self, cmd: ResumeOffer) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET status = 'live' \
             WHERE id = $1 AND status = 'paused' AND qty_available > 0 AND pickup_end > $2",
        )
        .bind(cmd.offer_id)
        .bind(cmd.now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Admin force-set, no guard beyond existence.
pub struct SetOfferStatus {
    pub offer_id: Uuid,
    pub status: OfferStatus,
}

impl Processor<SetOfferStatus> for DatabaseProcessor {
    type Output = Option<Offer>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:SetOfferStatus")]
    async fn process(&self, cmd: SetOfferStatus) -> Result<Option<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "UPDATE offers SET status = $2 WHERE id = $1 RETURNING {OFFER_COLUMNS}"
        ))
        .bind(cmd.offer_id)
        .bind(cmd.status)
        .fetch_optional(&self.pool)
        .await
    }
}

impl Offer {
    pub async fn get_by_id_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<Option<Offer>, sqlx::Error> {
        sqlx::query_as::<_, Offer>(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"
        ))
        .bind(offer_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Price charged for one unit, used when a capture row is written.
    pub async fn price_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<Option<OfferPrice>, sqlx::Error> {
        sqlx::query_as::<_, OfferPrice>(
            "SELECT price_cents, currency FROM offers WHERE id = $1",
        )
        .bind(offer_id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Claim one unit for a new reservation. Succeeds only while the offer
    /// is live and has stock; zero rows means the caller lost the race and
    /// must re-read to find out why.
    pub async fn reserve_unit_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET qty_available = qty_available - 1 \
             WHERE id = $1 AND status = 'live' AND qty_available > 0",
        )
        .bind(offer_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Return one unit to stock after a reservation expired. The upper
    /// bound keeps a double-applied release from pushing past `qty_total`.
    pub async fn restock_unit_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        offer_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE offers SET qty_available = qty_available + 1 \
             WHERE id = $1 AND qty_available < qty_total",
        )
        .bind(offer_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
