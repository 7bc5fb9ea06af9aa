use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::{jwt::JwtKeys, service};
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the bearer token, validates it and loads the active user.
/// Any failure along the way is the same 401.
pub struct CurrentUser(pub crate::store::User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        let keys = JwtKeys::from_ref(state);
        // Unauthenticated renders as the usual 401; a store failure must
        // stay a 500, so keep the service's own error mapping.
        let user = service::resolve_current_user(state.users.as_ref(), &keys, token)
            .await
            .map_err(ApiError::from)?;

        Ok(CurrentUser(user))
    }
}
