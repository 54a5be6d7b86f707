use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use savora_core::entities::UserRole;
use savora_core::unblock;
use uuid::Uuid;

use super::{CustomerApiError, penalty_to_response};
use crate::api::extractors::AuthUser;
use crate::state::AppState;

/// `POST /me/self-unblock/bank-transfer/{payment_id}/proof` — record that
/// the caller claims to have made the transfer.
///
/// Absence and foreign ownership both answer 404; non-owners cannot probe
/// for a payment's existence.
pub(super) async fn submit_proof(
    state: State<AppState>,
    auth: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, CustomerApiError> {
    if auth.role != UserRole::Customer {
        return Err(CustomerApiError::Forbidden);
    }

    let payment = unblock::mark_proof(&state.db, payment_id, auth.id).await?;

    Ok(Json(penalty_to_response(&payment)))
}
