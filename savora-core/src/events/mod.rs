//! Event channels connecting request handlers to background processors.
//!
//! Admin-triggered transitions emit an [`AuditEvent`] as a fire-and-forget
//! side call; the `AuditWriter` persists it. Events are ephemeral and carry
//! only what the audit row needs — losing one never rolls back the
//! transition that emitted it.

pub mod channels;
pub mod types;

pub use channels::{AuditEventReceiver, AuditEventSender, DEFAULT_CHANNEL_BUFFER, audit_event_channel};
pub use types::AuditEvent;
