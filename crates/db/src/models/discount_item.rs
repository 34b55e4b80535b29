//! Furniture discount (approval) item model and DTOs.

use redtag_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `discount_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DiscountItem {
    pub id: DbId,
    pub image_paths: Vec<String>,
    pub price: Decimal,
    pub notes: Option<String>,
    pub date_added: Date,
    pub approval_status: String,
    pub approval_note: Option<String>,
    pub approved_by: Option<DbId>,
    pub approved_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated input for inserting a pending discount item.
#[derive(Debug, Clone)]
pub struct CreateDiscountItem {
    pub image_paths: Vec<String>,
    pub price: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
}

/// Validated input for editing a pending discount item.
///
/// `None` fields keep their current value. New images are appended.
#[derive(Debug, Clone, Default)]
pub struct UpdateDiscountItem {
    pub price: Option<Decimal>,
    pub notes: Option<String>,
    pub append_image_paths: Vec<String>,
}

/// Request body for `POST /discount-items/{id}/approve`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveDiscountItem {
    pub approval_note: Option<String>,
}

/// Query parameters for listing discount items.
#[derive(Debug, Deserialize)]
pub struct DiscountItemListParams {
    pub status: Option<String>,
}
