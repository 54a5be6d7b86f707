//! Database row types and their query messages.
//!
//! Each entity module defines:
//! - the row struct(s) mapped with `sqlx::FromRow`,
//! - message structs processed by [`DatabaseProcessor`](crate::framework::DatabaseProcessor)
//!   for pool-level queries,
//! - `_tx` associated functions for the steps that must commit inside a
//!   surrounding transaction.

pub mod audit;
pub mod offer;
pub mod order;
pub mod payment;
pub mod penalty_payment;
pub mod strike;
pub mod user;
pub mod vendor;

/// Role attached to the authenticated principal by the external auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Vendor,
    Admin,
}
