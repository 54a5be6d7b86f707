//! Customer API handlers.
//!
//! # Endpoints
//!
//! - `POST /orders` – reserve one unit of a live offer
//! - `POST /me/self-unblock/bank-transfer/init` – open a penalty payment
//! - `POST /me/self-unblock/bank-transfer/{payment_id}/proof` – claim the
//!   transfer was made

use axum::{Router, http::StatusCode, response::IntoResponse, routing::post};
use savora_core::entities::offer::OfferStatus;
use savora_core::entities::penalty_payment::{PenaltyPayment, PenaltyStatus};
use savora_core::reservation::ReservationError;
use savora_core::unblock::UnblockError;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

mod create_order;
mod init_unblock;
mod submit_proof;

/// Build the Customer API router (mounted at the root).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order::create_order))
        .route(
            "/me/self-unblock/bank-transfer/init",
            post(init_unblock::init_unblock),
        )
        .route(
            "/me/self-unblock/bank-transfer/{payment_id}/proof",
            post(submit_proof::submit_proof),
        )
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Customer API handlers.
#[derive(Debug)]
pub(crate) enum CustomerApiError {
    Database(sqlx::Error),
    NotFound,
    /// Route requires the customer role.
    Forbidden,
    OfferNotLive(OfferStatus),
    SoldOut,
    /// Cooldown window still open; carries its end as a unix timestamp.
    CooldownActive(i64),
}

impl From<ReservationError> for CustomerApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::OfferNotFound => Self::NotFound,
            ReservationError::OfferNotLive { status } => Self::OfferNotLive(status),
            ReservationError::SoldOut => Self::SoldOut,
            ReservationError::Database(e) => Self::Database(e),
        }
    }
}

impl From<UnblockError> for CustomerApiError {
    fn from(err: UnblockError) -> Self {
        match err {
            UnblockError::NotFound => Self::NotFound,
            UnblockError::CooldownActive { ends_at } => {
                Self::CooldownActive(ends_at.assume_utc().unix_timestamp())
            }
            UnblockError::Database(e) => Self::Database(e),
            // Confirm-only variants cannot surface from initiate/mark_proof.
            other => {
                tracing::error!(error = %other, "Unexpected unblock error in customer handler");
                Self::NotFound
            }
        }
    }
}

impl IntoResponse for CustomerApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            CustomerApiError::Database(e) => {
                tracing::error!(error = %e, "Customer API database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": "INTERNAL" })),
                )
                    .into_response()
            }
            CustomerApiError::NotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(json!({ "error": "NOT_FOUND" })),
            )
                .into_response(),
            CustomerApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                axum::Json(json!({ "error": "FORBIDDEN" })),
            )
                .into_response(),
            CustomerApiError::OfferNotLive(status) => (
                StatusCode::CONFLICT,
                axum::Json(json!({ "error": "OFFER_NOT_LIVE", "status": status })),
            )
                .into_response(),
            CustomerApiError::SoldOut => (
                StatusCode::CONFLICT,
                axum::Json(json!({ "error": "SOLD_OUT" })),
            )
                .into_response(),
            CustomerApiError::CooldownActive(ends_at) => (
                StatusCode::CONFLICT,
                axum::Json(json!({ "error": "COOLDOWN_ACTIVE", "ends_at": ends_at })),
            )
                .into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a `PenaltyPayment` (DB model) into the API representation.
#[derive(Debug, Serialize)]
pub(crate) struct PenaltyPaymentResponse {
    pub payment_id: Uuid,
    pub status: PenaltyStatus,
    pub amount_cents: i32,
    pub currency: String,
    pub reference: String,
    pub expires_at: i64,
    pub bank_txn_ref: Option<String>,
    pub created_at: i64,
}

pub(crate) fn penalty_to_response(payment: &PenaltyPayment) -> PenaltyPaymentResponse {
    PenaltyPaymentResponse {
        payment_id: payment.id,
        status: payment.status,
        amount_cents: payment.amount_cents,
        currency: payment.currency.clone(),
        reference: payment.reference.clone(),
        expires_at: payment.expires_at.assume_utc().unix_timestamp(),
        bank_txn_ref: payment.bank_txn_ref.clone(),
        created_at: payment.created_at.assume_utc().unix_timestamp(),
    }
}
