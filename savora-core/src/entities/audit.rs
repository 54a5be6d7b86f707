use crate::entities::UserRole;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

#[derive(Debug, Clone)]
/// Append one admin audit row. Written only by the
/// [`AuditWriter`](crate::processors::audit_writer::AuditWriter); a failed
/// insert is logged there and never fails the action that caused it.
pub struct InsertAuditLog {
    pub actor_user_id: Uuid,
    pub actor_role: UserRole,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub meta: Option<serde_json::Value>,
}

impl Processor<InsertAuditLog> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertAuditLog")]
    async fn process(&self, insert: InsertAuditLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO admin_audit_log \
             (id, actor_user_id, actor_role, action, target_type, target_id, meta) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(insert.actor_user_id)
        .bind(insert.actor_role)
        .bind(insert.action)
        .bind(insert.target_type)
        .bind(insert.target_id)
        .bind(insert.meta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
