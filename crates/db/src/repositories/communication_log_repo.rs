//! Repository for the `communication_log` table and its per-user ledgers
//! (`urgent_note_dismissals`, `communication_log_reads`).

use redtag_core::types::DbId;
use sqlx::PgPool;

use crate::models::communication_log::{
    CommunicationLogEntry, CommunicationLogView, EntryChanges, NewEntry, UrgentNote,
};

/// Column list for communication_log queries.
const COLUMNS: &str = "id, user_id, note, category, is_pinned, is_urgent, image_paths, \
    deleted_at, created_at, updated_at";

/// Same columns, qualified for queries that join `users u`.
const ENTRY_COLUMNS: &str = "c.id, c.user_id, c.note, c.category, c.is_pinned, c.is_urgent, \
    c.image_paths, c.deleted_at, c.created_at, c.updated_at";

/// Columns for [`UrgentNote`] rows.
const URGENT_COLUMNS: &str = "c.id, c.note, c.category, u.username AS author_username, \
    u.role AS author_role, c.created_at";

/// Provides communication log, read receipt and dismissal operations.
pub struct CommunicationLogRepo;

impl CommunicationLogRepo {
    // ── Entries ───────────────────────────────────────────────────────

    /// Insert a new entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewEntry,
    ) -> Result<CommunicationLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO communication_log (user_id, note, category, is_urgent, image_paths)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommunicationLogEntry>(&query)
            .bind(input.user_id)
            .bind(&input.note)
            .bind(&input.category)
            .bind(input.is_urgent)
            .bind(&input.image_paths)
            .fetch_one(pool)
            .await
    }

    /// Find a non-deleted entry by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CommunicationLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM communication_log WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, CommunicationLogEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List non-deleted entries as seen by `viewer_id`, pinned first then newest.
    pub async fn list_for_user(
        pool: &PgPool,
        viewer_id: DbId,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommunicationLogView>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS},
                    u.username AS author_username,
                    u.role AS author_role,
                    EXISTS(
                        SELECT 1 FROM communication_log_reads r
                        WHERE r.entry_id = c.id AND r.user_id = $1
                    ) AS is_read
             FROM communication_log c
             JOIN users u ON u.id = c.user_id
             WHERE c.deleted_at IS NULL
               AND ($2::text IS NULL OR c.category = $2)
             ORDER BY c.is_pinned DESC, c.created_at DESC, c.id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, CommunicationLogView>(&query)
            .bind(viewer_id)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Replace an entry's note and category (with its derived urgent flag).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &EntryChanges,
    ) -> Result<Option<CommunicationLogEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE communication_log SET note = $2, category = $3, is_urgent = $4
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommunicationLogEntry>(&query)
            .bind(id)
            .bind(&changes.note)
            .bind(&changes.category)
            .bind(changes.is_urgent)
            .fetch_optional(pool)
            .await
    }

    /// Flip the pinned flag of a non-deleted entry.
    pub async fn toggle_pin(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CommunicationLogEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE communication_log SET is_pinned = NOT is_pinned
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommunicationLogEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an entry. Returns `true` if a live row was deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE communication_log SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Urgent notes ──────────────────────────────────────────────────

    /// Load the broadcast payload for an urgent entry.
    pub async fn find_urgent_note(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UrgentNote>, sqlx::Error> {
        let query = format!(
            "SELECT {URGENT_COLUMNS}
             FROM communication_log c
             JOIN users u ON u.id = c.user_id
             WHERE c.id = $1 AND c.deleted_at IS NULL AND c.is_urgent"
        );
        sqlx::query_as::<_, UrgentNote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Urgent entries `user_id` has not dismissed, newest first.
    ///
    /// Clients call this on connect to catch up on anything pushed while
    /// they were offline.
    pub async fn list_undismissed_urgent(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UrgentNote>, sqlx::Error> {
        let query = format!(
            "SELECT {URGENT_COLUMNS}
             FROM communication_log c
             JOIN users u ON u.id = c.user_id
             WHERE c.deleted_at IS NULL
               AND c.is_urgent
               AND NOT EXISTS (
                    SELECT 1 FROM urgent_note_dismissals d
                    WHERE d.entry_id = c.id AND d.user_id = $1
               )
             ORDER BY c.created_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, UrgentNote>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Record that `user_id` dismissed an urgent entry, and mark it read.
    ///
    /// Both inserts run in one transaction and are idempotent. Returns `true`
    /// if this call created the dismissal, `false` if it already existed.
    pub async fn dismiss(pool: &PgPool, entry_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let dismissed = sqlx::query(
            "INSERT INTO urgent_note_dismissals (entry_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (entry_id, user_id) DO NOTHING",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO communication_log_reads (entry_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (entry_id, user_id) DO NOTHING",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(dismissed.rows_affected() > 0)
    }

    // ── Read receipts ─────────────────────────────────────────────────

    /// Record a read receipt. Returns `true` if it was newly created.
    pub async fn mark_read(pool: &PgPool, entry_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO communication_log_reads (entry_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT (entry_id, user_id) DO NOTHING",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count non-deleted entries `user_id` has not read.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM communication_log c
             WHERE c.deleted_at IS NULL
               AND NOT EXISTS (
                    SELECT 1 FROM communication_log_reads r
                    WHERE r.entry_id = c.id AND r.user_id = $1
               )",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
