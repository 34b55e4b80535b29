//! Route definitions for the `/discount-items` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::discount_items;
use crate::state::AppState;

/// Routes mounted at `/discount-items`.
///
/// ```text
/// GET    /                 -> list_items (?status)
/// POST   /                 -> create_item (multipart)
/// GET    /{id}             -> get_item
/// PUT    /{id}             -> update_item (multipart, pending only)
/// DELETE /{id}             -> delete_item
/// POST   /{id}/approve     -> approve_item (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(discount_items::list_items).post(discount_items::create_item),
        )
        .route(
            "/{id}",
            get(discount_items::get_item)
                .put(discount_items::update_item)
                .delete(discount_items::delete_item),
        )
        .route("/{id}/approve", post(discount_items::approve_item))
}
