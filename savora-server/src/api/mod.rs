//! HTTP API handlers.
//!
//! Handlers stay thin: role gating via the extractors, a call into
//! `savora-core`, and a translation of the core result into a JSON body.
//! Rejections carry a machine-readable `error` code alongside the HTTP
//! status.

pub mod admin;
pub mod customer;
pub mod extractors;
pub mod payments;
pub mod vendor;

use crate::state::AppState;
use savora_core::entities::offer::{Offer, OfferStatus};
use savora_core::entities::order::{Order, OrderStatus};
use savora_core::events::AuditEvent;
use serde::Serialize;
use uuid::Uuid;

/// Convert an RFC 3339 instant from a request body into the naive UTC
/// timestamp type stored in Postgres.
pub(crate) fn to_db_time(t: time::OffsetDateTime) -> time::PrimitiveDateTime {
    let utc = t.to_offset(time::UtcOffset::UTC);
    time::PrimitiveDateTime::new(utc.date(), utc.time())
}

/// Emit an audit event without coupling the response to its delivery. The
/// transition has already committed by the time this is called.
pub(crate) async fn emit_audit(state: &AppState, event: AuditEvent) {
    if let Err(e) = state.audit_tx.send(event).await {
        tracing::error!(error = %e, "Failed to emit audit event");
    }
}

/// Convert an `Offer` (DB model) into the API representation.
#[derive(Debug, Serialize)]
pub(crate) struct OfferResponse {
    pub offer_id: Uuid,
    pub vendor_id: Uuid,
    pub status: OfferStatus,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i32,
    pub currency: String,
    pub qty_total: i32,
    pub qty_available: i32,
    pub pickup_start: i64,
    pub pickup_end: i64,
    pub created_at: i64,
}

pub(crate) fn offer_to_response(offer: &Offer) -> OfferResponse {
    OfferResponse {
        offer_id: offer.id,
        vendor_id: offer.vendor_id,
        status: offer.status,
        title: offer.title.clone(),
        description: offer.description.clone(),
        price_cents: offer.price_cents,
        currency: offer.currency.clone(),
        qty_total: offer.qty_total,
        qty_available: offer.qty_available,
        pickup_start: offer.pickup_start.assume_utc().unix_timestamp(),
        pickup_end: offer.pickup_end.assume_utc().unix_timestamp(),
        created_at: offer.created_at.assume_utc().unix_timestamp(),
    }
}

/// Convert an `Order` (DB model) into the API representation.
#[derive(Debug, Serialize)]
pub(crate) struct OrderResponse {
    pub order_id: Uuid,
    pub offer_id: Uuid,
    pub customer_user_id: Uuid,
    pub status: OrderStatus,
    pub reserved_until: i64,
    pub created_at: i64,
}

pub(crate) fn order_to_response(order: &Order) -> OrderResponse {
    OrderResponse {
        order_id: order.id,
        offer_id: order.offer_id,
        customer_user_id: order.customer_user_id,
        status: order.status,
        reserved_until: order.reserved_until.assume_utc().unix_timestamp(),
        created_at: order.created_at.assume_utc().unix_timestamp(),
    }
}
