use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// Vendor record, consulted for offer ownership and the approved gate on
/// publish/resume. Vendor onboarding itself is handled elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Vendor {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub status: VendorStatus,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "vendor_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorStatus {
    Pending,
    Approved,
    Suspended,
}

#[derive(Debug, Clone)]
pub struct GetVendorById {
    pub vendor_id: Uuid,
}

impl Processor<GetVendorById> for DatabaseProcessor {
    type Output = Option<Vendor>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetVendorById")]
    async fn process(&self, query: GetVendorById) -> Result<Option<Vendor>, sqlx::Error> {
        sqlx::query_as::<_, Vendor>(
            "SELECT id, owner_user_id, status, name FROM vendors WHERE id = $1",
        )
        .bind(query.vendor_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Resolve the vendor record owned by an authenticated user. One vendor
/// per owner.
pub struct GetVendorByOwner {
    pub owner_user_id: Uuid,
}

impl Processor<GetVendorByOwner> for DatabaseProcessor {
    type Output = Option<Vendor>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetVendorByOwner")]
    async fn process(&self, query: GetVendorByOwner) -> Result<Option<Vendor>, sqlx::Error> {
        sqlx::query_as::<_, Vendor>(
            "SELECT id, owner_user_id, status, name FROM vendors WHERE owner_user_id = $1",
        )
        .bind(query.owner_user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
