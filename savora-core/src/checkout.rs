//! Mock payment capture.
//!
//! Payment-gateway integration is a non-goal; capture is simulated and
//! settles immediately. What matters is the lifecycle transition it drives:
//! `reserved -> paid` is guarded on the order still being reserved when the
//! UPDATE commits, so a reservation the sweeper expired a moment earlier is
//! reported as `NotPayable` with the observed status, not silently revived.

use crate::entities::offer::Offer;
use crate::entities::order::{Order, OrderStatus};
use crate::entities::payment::Payment;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("order not found")]
    OrderNotFound,
    #[error("order is not payable (current status {status:?})")]
    NotPayable { status: OrderStatus },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct MockCaptureOutcome {
    pub order: Order,
    pub payment: Payment,
}

/// Settle a mock payment for a reserved order. The conditional transition
/// and the capture row commit together.
pub async fn settle_mock_payment(
    pool: &PgPool,
    order_id: Uuid,
    provider_ref: Option<String>,
    now: time::PrimitiveDateTime,
) -> Result<MockCaptureOutcome, PaymentError> {
    let mut tx = pool.begin().await?;

    let order = Order::get_by_id_tx(&mut tx, order_id)
        .await?
        .ok_or(PaymentError::OrderNotFound)?;

    if order.status != OrderStatus::Reserved {
        return Err(PaymentError::NotPayable {
            status: order.status,
        });
    }

    if Order::mark_paid_tx(&mut tx, order_id).await? != 1 {
        // Lost the race against the sweeper (or another capture); report
        // whatever the row says now.
        let fresh = Order::get_by_id_tx(&mut tx, order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound)?;
        return Err(PaymentError::NotPayable {
            status: fresh.status,
        });
    }

    let price = Offer::price_tx(&mut tx, order.offer_id)
        .await?
        .ok_or(PaymentError::OrderNotFound)?;

    let provider_ref = provider_ref
        .unwrap_or_else(|| format!("mock_{}", now.assume_utc().unix_timestamp()));

    let payment = Payment::upsert_succeeded_tx(
        &mut tx,
        order_id,
        &provider_ref,
        price.price_cents,
        &price.currency,
    )
    .await?;

    let order = Order::get_by_id_tx(&mut tx, order_id)
        .await?
        .ok_or(PaymentError::OrderNotFound)?;

    tx.commit().await?;
    Ok(MockCaptureOutcome { order, payment })
}
