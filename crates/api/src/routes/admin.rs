//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                   -> list_users
/// POST   /users                   -> create_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(admin::list_users).post(admin::create_user))
}
