//! Handlers for the current user's profile and alert subscriptions.

use axum::extract::State;
use axum::Json;
use redtag_core::error::CoreError;
use redtag_db::models::user::{UpdateAlertPreferences, UserResponse};
use redtag_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn user_gone() -> AppError {
    AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
}

/// GET /api/v1/users/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(user_gone)?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/me/alert-preferences
///
/// Replace all three category subscriptions at once.
pub async fn update_alert_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateAlertPreferences>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::update_alert_preferences(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(user_gone)?;

    tracing::info!(
        user_id = auth.user_id,
        furniture = input.alert_furniture,
        clothing = input.alert_clothing,
        bric_a_brac = input.alert_bric_a_brac,
        "Alert preferences updated"
    );

    Ok(Json(DataResponse { data: user.into() }))
}
