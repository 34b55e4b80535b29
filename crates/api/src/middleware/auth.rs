//! JWT-based authentication extractor for Axum handlers.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use redtag_core::error::CoreError;
use redtag_core::types::DbId;
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a JWT access token.
///
/// The token is read from the `Authorization: Bearer <token>` header. When
/// the header is absent, an `access_token` query parameter is accepted
/// instead, since browser `EventSource` clients cannot set headers.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's role name (e.g. `"admin"`, `"manager"`, `"employee"`).
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// Pull the raw token out of the request, header first.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    if let Some(header) = parts.headers.get("authorization") {
        let value = header
            .to_str()
            .map_err(|_| unauthorized("Invalid Authorization header"))?;
        let token = value.strip_prefix("Bearer ").ok_or_else(|| {
            unauthorized("Invalid Authorization format. Expected: Bearer <token>")
        })?;
        return Ok(token.to_string());
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.access_token)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Missing Authorization header"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;

        let claims = validate_token(&token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
