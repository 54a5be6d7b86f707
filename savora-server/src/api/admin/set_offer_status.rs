use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use savora_core::entities::offer::{OfferStatus, SetOfferStatus};
use savora_core::events::AuditEvent;
use savora_core::framework::DatabaseProcessor;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::AdminApiError;
use crate::api::emit_audit;
use crate::api::extractors::AdminUser;
use crate::api::offer_to_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct SetStatusBody {
    pub offer_id: Uuid,
    pub status: OfferStatus,
}

/// `POST /admin/offers/status` — force an offer into a status, bypassing
/// the vendor-facing transition guards.
pub(super) async fn set_offer_status(
    state: State<AppState>,
    AdminUser(admin): AdminUser,
    Json(body): Json<SetStatusBody>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let offer = processor
        .process(SetOfferStatus {
            offer_id: body.offer_id,
            status: body.status,
        })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound)?;

    emit_audit(
        &state,
        AuditEvent {
            actor_user_id: admin.id,
            actor_role: admin.role,
            action: "OFFER_STATUS_FORCED",
            target_type: "offer",
            target_id: Some(body.offer_id.to_string()),
            meta: Some(json!({ "status": body.status })),
        },
    )
    .await;

    Ok(Json(offer_to_response(&offer)))
}
