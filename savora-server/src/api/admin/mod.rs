//! Admin API handlers.
//!
//! Every route requires the admin role, and every applied transition emits
//! an [`AuditEvent`](savora_core::events::AuditEvent) after commit.
//!
//! # Endpoints
//!
//! - `POST /self-unblock/{payment_id}/confirm` – verify a bank transfer
//! - `POST /expirer/tick`                      – run one sweep pass now
//! - `POST /offers/status`                     – force an offer status

use axum::{Router, http::StatusCode, response::IntoResponse, routing::post};
use savora_core::unblock::UnblockError;
use serde_json::json;

use crate::state::AppState;

mod confirm_unblock;
mod expirer_tick;
mod set_offer_status;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/self-unblock/{payment_id}/confirm",
            post(confirm_unblock::confirm_unblock),
        )
        .route("/expirer/tick", post(expirer_tick::expirer_tick))
        .route("/offers/status", post(set_offer_status::set_offer_status))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Database(sqlx::Error),
    NotFound,
    Unblock(UnblockError),
}

impl From<UnblockError> for AdminApiError {
    fn from(err: UnblockError) -> Self {
        match err {
            UnblockError::NotFound => Self::NotFound,
            UnblockError::Database(e) => Self::Database(e),
            other => Self::Unblock(other),
        }
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": "INTERNAL" })),
                )
                    .into_response()
            }
            AdminApiError::NotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(json!({ "error": "NOT_FOUND" })),
            )
                .into_response(),
            AdminApiError::Unblock(err) => {
                let body = match err {
                    UnblockError::ConfirmNotAllowedExpired => {
                        json!({ "error": "CONFIRM_NOT_ALLOWED_EXPIRED" })
                    }
                    UnblockError::ConfirmNotAllowed { status } => {
                        json!({ "error": "CONFIRM_NOT_ALLOWED", "status": status })
                    }
                    UnblockError::ConfirmRequiresProof => {
                        json!({ "error": "CONFIRM_REQUIRES_PROOF" })
                    }
                    UnblockError::ConfirmNotAllowedState { status } => {
                        json!({ "error": "CONFIRM_NOT_ALLOWED_STATE", "status": status })
                    }
                    UnblockError::CooldownActive { ends_at } => {
                        json!({
                            "error": "COOLDOWN_ACTIVE",
                            "ends_at": ends_at.assume_utc().unix_timestamp(),
                        })
                    }
                    UnblockError::NotFound | UnblockError::Database(_) => {
                        json!({ "error": "INTERNAL" })
                    }
                };
                (StatusCode::CONFLICT, axum::Json(body)).into_response()
            }
        }
    }
}
