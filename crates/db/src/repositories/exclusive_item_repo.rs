//! Repository for the `exclusive_items` table.
//!
//! The promotion sweep ([`ExclusiveItemRepo::promote_due`]) and the reads are
//! separate calls; handlers run the sweep first so no read ever surfaces a
//! week 4 item that is due for color cycle.

use redtag_core::markdown::{alert_thresholds, COLOR_CYCLE_WEEK, FIRST_WEEK, PROMOTION_SOURCE_WEEK};
use redtag_core::types::{Date, DbId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::exclusive_item::{
    BulkUpdateOutcome, CreateExclusiveItem, ExclusiveItem, ExclusiveItemAlert,
    UpdateExclusiveItem,
};

/// Column list for exclusive_items queries.
const COLUMNS: &str = "id, category, price, date_arrived, week, notes, image_path, \
    created_by, deleted_at, created_at, updated_at";

/// Provides the markdown ladder operations for exclusive items.
pub struct ExclusiveItemRepo;

impl ExclusiveItemRepo {
    /// Insert a new item at week 1, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExclusiveItem,
    ) -> Result<ExclusiveItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO exclusive_items
                (category, price, date_arrived, week, notes, image_path, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExclusiveItem>(&query)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.date_arrived)
            .bind(FIRST_WEEK)
            .bind(&input.notes)
            .bind(&input.image_path)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted item by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExclusiveItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exclusive_items WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, ExclusiveItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Promote every week 4 item aged at least `after_days` to week 5.
    ///
    /// A single predicate UPDATE: concurrent sweeps cannot double-promote,
    /// because a promoted row no longer matches `week = 4`. Returns the number
    /// of rows promoted.
    pub async fn promote_due(
        pool: &PgPool,
        today: Date,
        after_days: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE exclusive_items SET week = $1
             WHERE deleted_at IS NULL
               AND week = $2
               AND ($3::date - date_arrived) >= $4",
        )
        .bind(COLOR_CYCLE_WEEK)
        .bind(PROMOTION_SOURCE_WEEK)
        .bind(today)
        .bind(after_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List non-deleted items, week ascending then newest arrival first.
    ///
    /// Pure read; does not run the sweep.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
    ) -> Result<Vec<ExclusiveItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM exclusive_items
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR category = $1)
             ORDER BY week ASC, date_arrived DESC, id DESC"
        );
        sqlx::query_as::<_, ExclusiveItem>(&query)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// List items in `categories` that need staff attention as of `today`.
    ///
    /// The per-week age thresholds come from [`alert_thresholds`], bound as
    /// parallel arrays. An empty `categories` slice matches nothing.
    pub async fn list_alerts(
        pool: &PgPool,
        categories: &[&str],
        today: Date,
    ) -> Result<Vec<ExclusiveItemAlert>, sqlx::Error> {
        let categories: Vec<String> = categories.iter().map(|c| (*c).to_string()).collect();
        let (weeks, thresholds): (Vec<i32>, Vec<i64>) = alert_thresholds().into_iter().unzip();
        let query = format!(
            "SELECT {COLUMNS}, ($2::date - date_arrived) AS days_elapsed
             FROM exclusive_items
             JOIN UNNEST($3::int4[], $4::int8[]) AS t(alert_week, min_days)
               ON t.alert_week = exclusive_items.week
             WHERE deleted_at IS NULL
               AND category = ANY($1)
               AND ($2::date - date_arrived) >= t.min_days
             ORDER BY week DESC, date_arrived ASC, id ASC"
        );
        sqlx::query_as::<_, ExclusiveItemAlert>(&query)
            .bind(categories)
            .bind(today)
            .bind(weeks)
            .bind(thresholds)
            .fetch_all(pool)
            .await
    }

    /// Apply a full update to a non-deleted item.
    ///
    /// The row only matches while the requested week is not behind the stored
    /// week. Returns `None` when the item is missing, deleted, or the week
    /// would regress; callers re-read to tell these apart.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExclusiveItem,
    ) -> Result<Option<ExclusiveItem>, sqlx::Error> {
        let query = format!(
            "UPDATE exclusive_items SET
                category = $2,
                price = $3,
                week = $4,
                notes = $5,
                image_path = CASE WHEN $7 THEN NULL ELSE COALESCE($6, image_path) END
             WHERE id = $1 AND deleted_at IS NULL AND week <= $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExclusiveItem>(&query)
            .bind(id)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.week)
            .bind(&input.notes)
            .bind(&input.image_path)
            .bind(input.clear_image)
            .fetch_optional(pool)
            .await
    }

    /// Apply price/week pairs to a batch of items in one transaction.
    ///
    /// All-or-nothing: the first missing id or week regression aborts the
    /// batch and nothing is written.
    pub async fn bulk_update(
        pool: &PgPool,
        entries: &[(DbId, Decimal, i32)],
    ) -> Result<BulkUpdateOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE exclusive_items SET price = $2, week = $3
             WHERE id = $1 AND deleted_at IS NULL AND week <= $3
             RETURNING {COLUMNS}"
        );

        let mut updated = Vec::with_capacity(entries.len());
        for &(id, price, week) in entries {
            let row = sqlx::query_as::<_, ExclusiveItem>(&query)
                .bind(id)
                .bind(price)
                .bind(week)
                .fetch_optional(&mut *tx)
                .await?;

            match row {
                Some(item) => updated.push(item),
                None => {
                    let current_week: Option<i32> = sqlx::query_scalar(
                        "SELECT week FROM exclusive_items WHERE id = $1 AND deleted_at IS NULL",
                    )
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;

                    // Dropping `tx` without commit rolls the batch back.
                    return Ok(match current_week {
                        Some(current_week) => BulkUpdateOutcome::Regressed { id, current_week },
                        None => BulkUpdateOutcome::Missing(id),
                    });
                }
            }
        }

        tx.commit().await?;
        Ok(BulkUpdateOutcome::Updated(updated))
    }

    /// Soft-delete an item. Returns `true` if a live row was deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE exclusive_items SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Take a week 5 item off the ladder after it has gone to color cycle.
    ///
    /// Same storage effect as [`soft_delete`](Self::soft_delete), but only
    /// matches items at week 5. Returns the removed row.
    pub async fn move_to_color_cycle(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExclusiveItem>, sqlx::Error> {
        let query = format!(
            "UPDATE exclusive_items SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL AND week = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExclusiveItem>(&query)
            .bind(id)
            .bind(COLOR_CYCLE_WEEK)
            .fetch_optional(pool)
            .await
    }
}
