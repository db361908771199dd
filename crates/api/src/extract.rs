//! Request extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity: `x-user-id`, or the configured default owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Owner(state.config.default_owner_id));
        };

        value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Owner)
            .ok_or_else(|| AppError::BadRequest(format!("{USER_ID_HEADER} must be a UUID")))
    }
}
