//! Exclusive ("red tag") item model and DTOs.

use redtag_core::markdown::WeekInput;
use redtag_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `exclusive_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExclusiveItem {
    pub id: DbId,
    pub category: String,
    pub price: Decimal,
    pub date_arrived: Date,
    pub week: i32,
    pub notes: Option<String>,
    pub image_path: Option<String>,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An item in a user's alert list, with its age at query time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExclusiveItemAlert {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: ExclusiveItem,
    pub days_elapsed: i32,
}

/// Validated input for inserting an item. Always starts at week 1.
#[derive(Debug, Clone)]
pub struct CreateExclusiveItem {
    pub category: String,
    pub price: Decimal,
    pub date_arrived: Date,
    pub notes: Option<String>,
    pub image_path: Option<String>,
    pub created_by: Option<DbId>,
}

/// Validated input for a full item update.
///
/// `image_path` replaces the stored image when `Some`; `clear_image` removes
/// it. Neither set keeps the current image.
#[derive(Debug, Clone)]
pub struct UpdateExclusiveItem {
    pub category: String,
    pub price: Decimal,
    pub week: i32,
    pub notes: Option<String>,
    pub image_path: Option<String>,
    pub clear_image: bool,
}

/// One entry of a bulk price/week update request.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateEntry {
    pub id: DbId,
    pub price: Decimal,
    pub week: WeekInput,
}

/// Request body for `PUT /exclusive-items/bulk`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateRequest {
    pub items: Vec<BulkUpdateEntry>,
}

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ExclusiveItemListParams {
    pub category: Option<String>,
}

/// Result of a transactional bulk update.
#[derive(Debug)]
pub enum BulkUpdateOutcome {
    /// Every row was updated; the transaction committed.
    Updated(Vec<ExclusiveItem>),
    /// The given id was absent or deleted; the transaction rolled back.
    Missing(DbId),
    /// The entry would have moved the item to an earlier week; rolled back.
    Regressed { id: DbId, current_week: i32 },
}
