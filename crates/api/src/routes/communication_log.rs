//! Route definitions for the `/communication-log` resource.

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::handlers::communication_log;
use crate::state::AppState;
use crate::stream;

/// Routes mounted at `/communication-log`.
///
/// ```text
/// GET    /                 -> list_entries (?category, limit, offset)
/// POST   /                 -> create_entry
/// GET    /stream           -> stream_handler (Server-Sent Events)
/// GET    /urgent           -> list_urgent
/// GET    /unread-count     -> unread_count
/// PUT    /{id}             -> update_entry
/// DELETE /{id}             -> delete_entry
/// PATCH  /{id}/pin         -> toggle_pin
/// POST   /{id}/read        -> mark_read
/// POST   /{id}/dismiss     -> dismiss_urgent
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(communication_log::list_entries).post(communication_log::create_entry),
        )
        .route("/stream", get(stream::stream_handler))
        .route("/urgent", get(communication_log::list_urgent))
        .route("/unread-count", get(communication_log::unread_count))
        .route(
            "/{id}",
            put(communication_log::update_entry)
                .delete(communication_log::delete_entry),
        )
        .route("/{id}/pin", patch(communication_log::toggle_pin))
        .route("/{id}/read", post(communication_log::mark_read))
        .route("/{id}/dismiss", post(communication_log::dismiss_urgent))
}
