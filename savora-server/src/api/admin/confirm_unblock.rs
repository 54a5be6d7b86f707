use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use savora_core::entities::penalty_payment::PenaltyStatus;
use savora_core::events::AuditEvent;
use savora_core::unblock;
use savora_core::utils::clock::now_utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::AdminApiError;
use crate::api::emit_audit;
use crate::api::extractors::AdminUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct ConfirmBody {
    pub bank_txn_ref: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ConfirmResponse {
    pub payment_id: Uuid,
    pub status: PenaltyStatus,
    pub bank_txn_ref: Option<String>,
    pub last_self_unblock_at: Option<i64>,
}

/// `POST /admin/self-unblock/{payment_id}/confirm` — verify the customer's
/// bank transfer and lift their block.
///
/// Idempotent: confirming an already-confirmed payment returns the stored
/// result without re-applying the strike reduction.
pub(super) async fn confirm_unblock(
    state: State<AppState>,
    AdminUser(admin): AdminUser,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<ConfirmBody>,
) -> Result<impl IntoResponse, AdminApiError> {
    let outcome = unblock::confirm(
        &state.db,
        &state.config.unblock,
        payment_id,
        &body.bank_txn_ref,
        now_utc(),
    )
    .await?;

    emit_audit(
        &state,
        AuditEvent {
            actor_user_id: admin.id,
            actor_role: admin.role,
            action: "SELF_UNBLOCK_CONFIRM",
            target_type: "penalty_payment",
            target_id: Some(payment_id.to_string()),
            meta: Some(json!({ "bank_txn_ref": body.bank_txn_ref })),
        },
    )
    .await;

    Ok(Json(ConfirmResponse {
        payment_id: outcome.payment_id,
        status: outcome.status,
        bank_txn_ref: outcome.bank_txn_ref,
        last_self_unblock_at: outcome
            .last_self_unblock_at
            .map(|t| t.assume_utc().unix_timestamp()),
    }))
}
