use super::types::AuditEvent;
use tokio::sync::mpsc;

/// Buffer enough for bursts of admin activity while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

pub type AuditEventSender = mpsc::Sender<AuditEvent>;
pub type AuditEventReceiver = mpsc::Receiver<AuditEvent>;

/// Create the audit event channel. The sender side is cloned into every
/// handler that performs an audited transition.
pub fn audit_event_channel() -> (AuditEventSender, AuditEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
