//! Mock payment gateway callback.
//!
//! `POST /payments/mock/succeed` stands in for the capture notification a
//! real gateway would deliver, so it is not behind the principal headers.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use savora_core::checkout::{self, PaymentError};
use savora_core::entities::payment::{Payment, PaymentStatus};
use savora_core::utils::clock::now_utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::{OrderResponse, order_to_response};
use crate::state::AppState;

/// Build the payments router (mounted at the root).
pub fn router() -> Router<AppState> {
    Router::new().route("/payments/mock/succeed", post(mock_succeed))
}

#[derive(Debug, Deserialize)]
struct MockSucceedBody {
    pub order_id: Uuid,
    pub provider_ref: Option<String>,
}

#[derive(Debug, Serialize)]
struct PaymentResponse {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub status: PaymentStatus,
    pub provider: String,
    pub provider_ref: String,
    pub amount_cents: i32,
    pub currency: String,
    pub created_at: i64,
}

fn payment_to_response(payment: &Payment) -> PaymentResponse {
    PaymentResponse {
        payment_id: payment.id,
        order_id: payment.order_id,
        status: payment.status,
        provider: payment.provider.clone(),
        provider_ref: payment.provider_ref.clone(),
        amount_cents: payment.amount_cents,
        currency: payment.currency.clone(),
        created_at: payment.created_at.assume_utc().unix_timestamp(),
    }
}

#[derive(Debug, Serialize)]
struct MockSucceedResponse {
    pub order: OrderResponse,
    pub payment: PaymentResponse,
}

/// `POST /payments/mock/succeed` — settle an order's mock capture,
/// `reserved -> paid`.
async fn mock_succeed(
    state: State<AppState>,
    Json(body): Json<MockSucceedBody>,
) -> Result<impl IntoResponse, PaymentApiError> {
    let outcome =
        checkout::settle_mock_payment(&state.db, body.order_id, body.provider_ref, now_utc())
            .await?;

    Ok(Json(MockSucceedResponse {
        order: order_to_response(&outcome.order),
        payment: payment_to_response(&outcome.payment),
    }))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in the mock payment handler.
#[derive(Debug)]
struct PaymentApiError(PaymentError);

impl From<PaymentError> for PaymentApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PaymentApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            PaymentError::OrderNotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(json!({ "error": "NOT_FOUND" })),
            )
                .into_response(),
            PaymentError::NotPayable { status } => (
                StatusCode::CONFLICT,
                axum::Json(json!({ "error": "NOT_PAYABLE", "status": status })),
            )
                .into_response(),
            PaymentError::Database(e) => {
                tracing::error!(error = %e, "Mock payment database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({ "error": "INTERNAL" })),
                )
                    .into_response()
            }
        }
    }
}
