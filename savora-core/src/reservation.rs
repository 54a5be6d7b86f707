//! Reservation creation.
//!
//! Claiming a unit is the only place the inventory counter goes down, and
//! it races with the sweeper's restock. The decrement is a guarded UPDATE
//! (`status = 'live' AND qty_available > 0`); when it matches zero rows the
//! offer is re-read inside the same transaction to name the reason instead
//! of surfacing a generic conflict.

use crate::entities::offer::{Offer, OfferStatus};
use crate::entities::order::Order;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Reservation tunables, loaded from the server config.
#[derive(Debug, Clone)]
pub struct ReservationConfig {
    /// How long a fresh reservation holds its unit before payment is due.
    pub hold: time::Duration,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            hold: time::Duration::minutes(15),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("offer not found")]
    OfferNotFound,
    #[error("offer is not live (current status {status:?})")]
    OfferNotLive { status: OfferStatus },
    #[error("offer is sold out")]
    SoldOut,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create a reservation: decrement the offer's stock and insert the
/// `reserved` order as one atomic unit.
pub async fn reserve(
    pool: &PgPool,
    config: &ReservationConfig,
    offer_id: Uuid,
    customer_user_id: Uuid,
    now: time::PrimitiveDateTime,
) -> Result<Order, ReservationError> {
    let mut tx = pool.begin().await?;

    if Offer::reserve_unit_tx(&mut tx, offer_id).await? != 1 {
        let offer = Offer::get_by_id_tx(&mut tx, offer_id)
            .await?
            .ok_or(ReservationError::OfferNotFound)?;
        return Err(if offer.status != OfferStatus::Live {
            ReservationError::OfferNotLive {
                status: offer.status,
            }
        } else {
            ReservationError::SoldOut
        });
    }

    let order =
        Order::insert_reserved_tx(&mut tx, offer_id, customer_user_id, now + config.hold).await?;

    tx.commit().await?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hold_is_fifteen_minutes() {
        assert_eq!(
            ReservationConfig::default().hold,
            time::Duration::minutes(15)
        );
    }
}
