//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use redtag_core::error::CoreError;
use redtag_core::roles::validate_role;
use redtag_db::models::user::{CreateUser, UserResponse};
use redtag_db::repositories::UserRepo;
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// POST /api/v1/admin/users
///
/// Create a staff account. The password is hashed before storage.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let username = input.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be empty".into(),
        )));
    }
    validate_role(&input.role).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email: input.email.trim().to_string(),
            password_hash: hashed,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = user.id,
        role = %user.role,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}
