use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::identity::Identity;
use crate::app::AppState;
use crate::db::users;
use crate::errors::AppError;
use crate::jwt::AuthUser;

/// Resolves the bearer token into an [`Identity`] loaded fresh from the database.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        users::load_identity(&state.pool, auth.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("account is inactive or no longer exists"))
    }
}
