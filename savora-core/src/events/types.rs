use crate::entities::UserRole;
use uuid::Uuid;

/// An admin action worth an audit row.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub actor_user_id: Uuid,
    pub actor_role: UserRole,
    /// Machine-readable action name, e.g. `SELF_UNBLOCK_CONFIRM`.
    pub action: &'static str,
    pub target_type: &'static str,
    pub target_id: Option<String>,
    pub meta: Option<serde_json::Value>,
}
