//! AuditWriter processor.
//!
//! Drains [`AuditEvent`]s emitted by admin handlers and persists them as
//! `admin_audit_log` rows. The channel is fire-and-forget by design: the
//! transition that produced an event has already committed, so an insert
//! failure is logged and dropped, never propagated.

use crate::entities::audit::InsertAuditLog;
use crate::events::{AuditEvent, AuditEventReceiver};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{error, info};

pub struct AuditWriter {
    pool: PgPool,
    event_rx: AuditEventReceiver,
    shutdown_rx: watch::Receiver<bool>,
}

impl AuditWriter {
    pub fn new(
        pool: PgPool,
        event_rx: AuditEventReceiver,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            pool,
            event_rx,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        info!("AuditWriter started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("AuditWriter received shutdown signal");
                        break;
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    self.write(event).await;
                }

                else => {
                    info!("AuditEvent channel closed");
                    break;
                }
            }
        }

        // Drain whatever is still buffered before exiting.
        while let Ok(event) = self.event_rx.try_recv() {
            self.write(event).await;
        }

        info!("AuditWriter shutdown complete");
    }

    async fn write(&self, event: AuditEvent) {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        let action = event.action;
        let insert = InsertAuditLog {
            actor_user_id: event.actor_user_id,
            actor_role: event.actor_role,
            action: event.action.to_owned(),
            target_type: event.target_type.to_owned(),
            target_id: event.target_id,
            meta: event.meta,
        };
        if let Err(e) = processor.process(insert).await {
            error!(action, error = %e, "Failed to write audit row");
        }
    }
}
