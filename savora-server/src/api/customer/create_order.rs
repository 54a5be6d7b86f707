use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use savora_core::entities::UserRole;
use savora_core::reservation;
use savora_core::utils::clock::now_utc;
use serde::Deserialize;
use uuid::Uuid;

use super::CustomerApiError;
use crate::api::extractors::AuthUser;
use crate::api::order_to_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderBody {
    pub offer_id: Uuid,
}

/// `POST /orders` — reserve one unit of a live offer for the caller.
///
/// The stock decrement and the order insert commit together in core; a
/// guard failure comes back already classified.
pub(super) async fn create_order(
    state: State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateOrderBody>,
) -> Result<impl IntoResponse, CustomerApiError> {
    if auth.role != UserRole::Customer {
        return Err(CustomerApiError::Forbidden);
    }

    let order = reservation::reserve(
        &state.db,
        &state.config.reservation,
        body.offer_id,
        auth.id,
        now_utc(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(order_to_response(&order))))
}
