pub mod admin;
pub mod auth;
pub mod communication_log;
pub mod discount_items;
pub mod exclusive_items;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
///
/// /users/me                                        current profile
/// /users/me/alert-preferences                      alert subscriptions (PUT)
///
/// /admin/users                                     list, create (admin only)
///
/// /exclusive-items                                 list, create (multipart)
/// /exclusive-items/alerts                          subscribed alerts
/// /exclusive-items/bulk                            bulk price/week update (PUT)
/// /exclusive-items/{id}                            get, update, delete
/// /exclusive-items/{id}/confirm-color-cycle        take off the ladder (POST)
///
/// /discount-items                                  list, create (multipart)
/// /discount-items/{id}                             get, update, delete
/// /discount-items/{id}/approve                     approve (admin only)
///
/// /communication-log                               list, create
/// /communication-log/stream                        urgent-note SSE stream
/// /communication-log/urgent                        undismissed urgent notes
/// /communication-log/unread-count                  unread entries for caller
/// /communication-log/{id}                          update, delete
/// /communication-log/{id}/pin                      toggle pin (PATCH)
/// /communication-log/{id}/read                     mark read (POST)
/// /communication-log/{id}/dismiss                  dismiss urgent (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/admin", admin::router())
        .nest("/exclusive-items", exclusive_items::router())
        .nest("/discount-items", discount_items::router())
        .nest("/communication-log", communication_log::router())
}
