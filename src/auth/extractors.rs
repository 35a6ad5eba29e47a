use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::{jwt::AuthUser, repo};
use crate::{error::AppError, state::AppState};

/// Verified token subject re-resolved to a live user row.
///
/// The lookup happens on every request so existing tokens stop working the
/// moment a user record is removed. A valid token whose subject no longer
/// resolves is plain `Unauthorized` — nothing here reveals whether an email
/// exists.
#[derive(Debug)]
pub struct CurrentUser(pub repo::User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(email) = AuthUser::from_request_parts(parts, state).await?;
        let user = repo::find_by_email(state, &email)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}
