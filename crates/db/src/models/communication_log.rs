//! Communication log entries, urgent notes, dismissals and read receipts.

use redtag_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `communication_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommunicationLogEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub note: String,
    pub category: String,
    pub is_pinned: bool,
    pub is_urgent: bool,
    pub image_paths: Vec<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An entry as seen by a specific user: author details plus read state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommunicationLogView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: CommunicationLogEntry,
    pub author_username: String,
    pub author_role: String,
    pub is_read: bool,
}

/// Payload of an urgent note, used by both the push stream and catch-up.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrgentNote {
    pub id: DbId,
    pub note: String,
    pub category: String,
    pub author_username: String,
    pub author_role: String,
    pub created_at: Timestamp,
}

/// Request body for `POST /communication-log`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub note: String,
    pub category: Option<String>,
    #[serde(default)]
    pub image_paths: Vec<String>,
}

/// Request body for `PUT /communication-log/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEntryRequest {
    pub note: Option<String>,
    pub category: Option<String>,
}

/// Validated input for inserting an entry. `is_urgent` is derived by the caller.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: DbId,
    pub note: String,
    pub category: String,
    pub is_urgent: bool,
    pub image_paths: Vec<String>,
}

/// Validated input for updating an entry's note and category together.
#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub note: String,
    pub category: String,
    pub is_urgent: bool,
}

/// Query parameters for listing entries.
#[derive(Debug, Deserialize)]
pub struct EntryListParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response body for the unread-count endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UnreadCount {
    pub unread: i64,
}
