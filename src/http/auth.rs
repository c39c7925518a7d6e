//! Caller identity.
//!
//! Requests name their caller through the `X-User-Id` header. The id must
//! resolve to an active account; anything else is rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::AppError;
use super::state::AppState;
use crate::db::repository::AccountRepository;
use crate::models::{User, UserId};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, loaded from the repository.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing X-User-Id header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("Malformed X-User-Id header".to_string()))?;

        let user_id: UserId = raw
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("Malformed user id '{}'", raw)))?;

        let user = match state.repository.get_user(user_id).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                return Err(AppError::Unauthorized(format!("Unknown user {}", user_id)))
            }
            Err(e) => return Err(e.into()),
        };

        if !user.active {
            return Err(AppError::Unauthorized(format!(
                "User {} is deactivated",
                user_id
            )));
        }

        Ok(CurrentUser(user))
    }
}
