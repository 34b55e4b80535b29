//! Repository for the `discount_items` table (furniture approval).

use redtag_core::discount::{STATUS_APPROVED, STATUS_PENDING};
use redtag_core::types::DbId;
use sqlx::PgPool;

use crate::models::discount_item::{CreateDiscountItem, DiscountItem, UpdateDiscountItem};

/// Column list for discount_items queries.
const COLUMNS: &str = "id, image_paths, price, notes, date_added, approval_status, \
    approval_note, approved_by, approved_at, created_by, deleted_at, created_at, updated_at";

/// Provides the approval lifecycle operations for discount items.
pub struct DiscountItemRepo;

impl DiscountItemRepo {
    /// Insert a new pending item, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDiscountItem,
    ) -> Result<DiscountItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO discount_items (image_paths, price, notes, approval_status, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(&input.image_paths)
            .bind(input.price)
            .bind(&input.notes)
            .bind(STATUS_PENDING)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DiscountItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_items WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List non-deleted items, pending first, then newest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<DiscountItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discount_items
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR approval_status = $1)
             ORDER BY (approval_status = '{STATUS_PENDING}') DESC, date_added DESC, id DESC"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Edit a pending item.
    ///
    /// The pending check and the write are one statement, so an approval
    /// racing this edit cannot be overwritten. Returns `None` if the item is
    /// missing, deleted or already approved.
    pub async fn update_pending(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDiscountItem,
    ) -> Result<Option<DiscountItem>, sqlx::Error> {
        let query = format!(
            "UPDATE discount_items SET
                price = COALESCE($2, price),
                notes = COALESCE($3, notes),
                image_paths = image_paths || $4
             WHERE id = $1 AND deleted_at IS NULL AND approval_status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(id)
            .bind(input.price)
            .bind(&input.notes)
            .bind(&input.append_image_paths)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Approve a pending item, stamping approver, time and optional note.
    ///
    /// Returns `None` if the item is missing, deleted or already approved.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        approver_id: DbId,
        approval_note: Option<&str>,
    ) -> Result<Option<DiscountItem>, sqlx::Error> {
        let query = format!(
            "UPDATE discount_items SET
                approval_status = $2,
                approved_by = $3,
                approved_at = NOW(),
                approval_note = $4
             WHERE id = $1 AND deleted_at IS NULL AND approval_status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(id)
            .bind(STATUS_APPROVED)
            .bind(approver_id)
            .bind(approval_note)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an item in either status. Returns the removed row.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<Option<DiscountItem>, sqlx::Error> {
        let query = format!(
            "UPDATE discount_items SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DiscountItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
