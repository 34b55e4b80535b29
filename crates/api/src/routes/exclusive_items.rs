//! Route definitions for the `/exclusive-items` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::exclusive_items;
use crate::state::AppState;

/// Routes mounted at `/exclusive-items`.
///
/// ```text
/// GET    /                           -> list_items (?category)
/// POST   /                           -> create_item (multipart)
/// GET    /alerts                     -> list_alerts
/// PUT    /bulk                       -> bulk_update
/// GET    /{id}                       -> get_item
/// PUT    /{id}                       -> update_item (multipart)
/// DELETE /{id}                       -> delete_item
/// POST   /{id}/confirm-color-cycle   -> confirm_color_cycle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(exclusive_items::list_items).post(exclusive_items::create_item),
        )
        .route("/alerts", get(exclusive_items::list_alerts))
        .route("/bulk", put(exclusive_items::bulk_update))
        .route(
            "/{id}",
            get(exclusive_items::get_item)
                .put(exclusive_items::update_item)
                .delete(exclusive_items::delete_item),
        )
        .route(
            "/{id}/confirm-color-cycle",
            post(exclusive_items::confirm_color_cycle),
        )
}
