//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /me                      -> me
/// PUT    /me/alert-preferences    -> update_alert_preferences
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/me/alert-preferences", put(users::update_alert_preferences))
}
