//! Authenticated principal injected by the upstream identity provider.
//!
//! Identity is an external collaborator: the gateway terminates
//! authentication and forwards an opaque principal through trusted headers.
//! This module only reads that contract; it never validates credentials.

use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";
pub const USER_ACTIVE_HEADER: &str = "x-user-active";

/// Opaque authenticated caller. The engine only ever consults the id for
/// ownership checks and the admin flag for privileged operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub is_admin: bool,
}

impl Principal {
    /// Owner-or-admin gate shared by every application route.
    pub fn may_act_on(&self, owner_id: &str) -> bool {
        self.is_admin || self.id == owner_id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthenticated("authentication required".to_string()))?
            .to_string();

        let active = parts
            .headers
            .get(USER_ACTIVE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        if !active {
            return Err(AppError::Unauthenticated(
                "account is deactivated".to_string(),
            ));
        }

        let is_admin = parts
            .headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|roles| {
                roles
                    .split(',')
                    .any(|role| role.trim().eq_ignore_ascii_case("admin"))
            })
            .unwrap_or(false);

        Ok(Principal { id, is_admin })
    }
}
