use axum::{Json, extract::State, response::IntoResponse};
use savora_core::events::AuditEvent;
use savora_core::processors::sweeper::sweep_once;
use serde_json::json;

use super::AdminApiError;
use crate::api::emit_audit;
use crate::api::extractors::AdminUser;
use crate::state::AppState;

/// `POST /admin/expirer/tick` — run one synchronous sweep pass and return
/// the applied transition counts. Usable whether or not the background
/// sweeper is enabled.
pub(super) async fn expirer_tick(
    state: State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<impl IntoResponse, AdminApiError> {
    let summary = sweep_once(&state.db, &state.config.sweeper)
        .await
        .map_err(AdminApiError::Database)?;

    emit_audit(
        &state,
        AuditEvent {
            actor_user_id: admin.id,
            actor_role: admin.role,
            action: "EXPIRER_TICK",
            target_type: "sweep",
            target_id: None,
            meta: Some(json!({
                "expired_orders": summary.expired_orders,
                "no_show_orders": summary.no_show_orders,
            })),
        },
    )
    .await;

    Ok(Json(summary))
}
