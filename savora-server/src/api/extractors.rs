//! Custom Axum extractors for request authentication.
//!
//! Authentication itself happens upstream: an external auth gateway
//! terminates the session and forwards the verified principal in trusted
//! headers. These extractors consume that contract:
//!
//! - `AuthUser` — reads `X-User-Id` / `X-User-Role` and rejects with 401
//!   when either is missing or malformed.
//! - `AdminUser` — an `AuthUser` that must carry the admin role (403
//!   otherwise).

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use savora_core::entities::UserRole;
use serde_json::json;
use uuid::Uuid;

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// The authenticated principal as attested by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Errors that can occur while reading the principal headers.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing X-User-Id header")]
    MissingUserId,
    #[error("invalid X-User-Id header")]
    InvalidUserId,
    #[error("missing X-User-Role header")]
    MissingRole,
    #[error("invalid X-User-Role header")]
    InvalidRole,
    #[error("admin role required")]
    AdminRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::MissingUserId => (StatusCode::UNAUTHORIZED, "MISSING_USER_ID"),
            AuthError::InvalidUserId => (StatusCode::UNAUTHORIZED, "INVALID_USER_ID"),
            AuthError::MissingRole => (StatusCode::UNAUTHORIZED, "MISSING_USER_ROLE"),
            AuthError::InvalidRole => (StatusCode::UNAUTHORIZED, "INVALID_USER_ROLE"),
            AuthError::AdminRequired => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        };
        (status, axum::Json(json!({ "error": code }))).into_response()
    }
}

fn parse_role(value: &str) -> Option<UserRole> {
    match value.to_ascii_uppercase().as_str() {
        "CUSTOMER" => Some(UserRole::Customer),
        "VENDOR" => Some(UserRole::Vendor),
        "ADMIN" => Some(UserRole::Admin),
        _ => None,
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AuthError::MissingUserId)?
            .to_str()
            .map_err(|_| AuthError::InvalidUserId)?;
        let id = Uuid::parse_str(id).map_err(|_| AuthError::InvalidUserId)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .ok_or(AuthError::MissingRole)?
            .to_str()
            .map_err(|_| AuthError::InvalidRole)?;
        let role = parse_role(role).ok_or(AuthError::InvalidRole)?;

        Ok(AuthUser { id, role })
    }
}

/// An [`AuthUser`] gated on the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(AuthError::AdminRequired);
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!(parse_role("admin"), Some(UserRole::Admin));
        assert_eq!(parse_role("ADMIN"), Some(UserRole::Admin));
        assert_eq!(parse_role("Vendor"), Some(UserRole::Vendor));
        assert_eq!(parse_role("customer"), Some(UserRole::Customer));
        assert_eq!(parse_role("root"), None);
        assert_eq!(parse_role(""), None);
    }
}
