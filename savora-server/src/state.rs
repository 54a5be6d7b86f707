//! Application state shared across all request handlers.

use crate::config::RuntimeConfig;
use savora_core::events::AuditEventSender;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Validated runtime configuration, fixed for the process lifetime.
    pub config: Arc<RuntimeConfig>,
    /// Sender half of the audit event channel; the `AuditWriter` task
    /// holds the receiver.
    pub audit_tx: AuditEventSender,
}

impl AppState {
    pub fn new(db: PgPool, config: RuntimeConfig, audit_tx: AuditEventSender) -> Self {
        Self {
            db,
            config: Arc::new(config),
            audit_tx,
        }
    }
}
