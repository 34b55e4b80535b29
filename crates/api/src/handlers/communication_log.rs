//! Handlers for the `/communication-log` resource.
//!
//! Entries in the Urgent category are additionally pushed to every open
//! stream (see [`crate::stream`]) once the insert has committed, and are
//! listed by the catch-up endpoint until each user dismisses them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use redtag_core::communication_log::{
    authorize_category, is_urgent_category, normalize_category, validate_note,
};
use redtag_core::error::CoreError;
use redtag_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use redtag_core::roles::is_admin;
use redtag_core::types::DbId;
use redtag_db::models::communication_log::{
    CommunicationLogEntry, CreateEntryRequest, EntryChanges, EntryListParams, NewEntry,
    UnreadCount, UpdateEntryRequest,
};
use redtag_db::repositories::CommunicationLogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "CommunicationLogEntry";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

async fn find_live(state: &AppState, id: DbId) -> AppResult<CommunicationLogEntry> {
    CommunicationLogRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Authors may change their own entries; admins may change any.
fn ensure_author_or_admin(auth: &AuthUser, entry: &CommunicationLogEntry) -> AppResult<()> {
    if entry.user_id == auth.user_id || is_admin(&auth.role) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an admin can change this entry".into(),
        )))
    }
}

/// Push a committed urgent entry to every open stream.
///
/// Best effort: the entry is already saved and reachable through catch-up,
/// so failures here are logged and never returned.
async fn publish_urgent(state: &AppState, entry_id: DbId) {
    let note = match CommunicationLogRepo::find_urgent_note(&state.pool, entry_id).await {
        Ok(Some(note)) => note,
        Ok(None) => {
            tracing::warn!(entry_id, "Urgent entry vanished before broadcast");
            return;
        }
        Err(e) => {
            tracing::warn!(entry_id, error = %e, "Failed to load urgent entry for broadcast");
            return;
        }
    };

    let delivered = state.stream_manager.broadcast(&note).await;
    tracing::info!(entry_id, delivered, "Urgent note broadcast");
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// GET /api/v1/communication-log?category=&limit=&offset=
pub async fn list_entries(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EntryListParams>,
) -> AppResult<impl IntoResponse> {
    let category = match params.category.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(normalize_category(Some(raw))?),
        _ => None,
    };
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let entries = CommunicationLogRepo::list_for_user(
        &state.pool,
        auth.user_id,
        category.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/communication-log
///
/// Urgent entries may only be posted by admins and are broadcast to every
/// open stream after the insert commits.
pub async fn create_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEntryRequest>,
) -> AppResult<impl IntoResponse> {
    let note = validate_note(&input.note)?;
    let category = normalize_category(input.category.as_deref())?;
    authorize_category(&category, &auth.role)?;

    let new_entry = NewEntry {
        user_id: auth.user_id,
        note,
        is_urgent: is_urgent_category(&category),
        category,
        image_paths: input.image_paths,
    };

    let entry = CommunicationLogRepo::create(&state.pool, &new_entry).await?;

    tracing::info!(
        user_id = auth.user_id,
        entry_id = entry.id,
        category = %entry.category,
        "Communication log entry created"
    );

    if entry.is_urgent {
        publish_urgent(&state, entry.id).await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/communication-log/{id}
///
/// Changing the category re-derives the urgent flag. Moving an entry into
/// Urgent is admin-only and does not broadcast it.
pub async fn update_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEntryRequest>,
) -> AppResult<impl IntoResponse> {
    let existing = find_live(&state, id).await?;
    ensure_author_or_admin(&auth, &existing)?;

    let note = match input.note.as_deref() {
        Some(raw) => validate_note(raw)?,
        None => existing.note,
    };
    let category = match input.category.as_deref() {
        Some(raw) => normalize_category(Some(raw))?,
        None => existing.category,
    };
    authorize_category(&category, &auth.role)?;

    let changes = EntryChanges {
        note,
        is_urgent: is_urgent_category(&category),
        category,
    };

    let updated = CommunicationLogRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(user_id = auth.user_id, entry_id = id, "Communication log entry updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/communication-log/{id}
pub async fn delete_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_live(&state, id).await?;
    ensure_author_or_admin(&auth, &existing)?;

    if !CommunicationLogRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(user_id = auth.user_id, entry_id = id, "Communication log entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/communication-log/{id}/pin
pub async fn toggle_pin(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = CommunicationLogRepo::toggle_pin(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::debug!(user_id = auth.user_id, entry_id = id, pinned = entry.is_pinned, "Pin toggled");
    Ok(Json(DataResponse { data: entry }))
}

// ---------------------------------------------------------------------------
// Read receipts
// ---------------------------------------------------------------------------

/// POST /api/v1/communication-log/{id}/read
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_live(&state, id).await?;
    CommunicationLogRepo::mark_read(&state.pool, id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/communication-log/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let unread = CommunicationLogRepo::unread_count(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { unread },
    }))
}

// ---------------------------------------------------------------------------
// Urgent notes
// ---------------------------------------------------------------------------

/// GET /api/v1/communication-log/urgent
///
/// Urgent entries the caller has not dismissed, newest first.
pub async fn list_urgent(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let notes = CommunicationLogRepo::list_undismissed_urgent(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// POST /api/v1/communication-log/{id}/dismiss
///
/// Idempotent. Also records a read receipt.
pub async fn dismiss_urgent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let is_urgent = CommunicationLogRepo::find_by_id(&state.pool, id)
        .await?
        .is_some_and(|entry| entry.is_urgent);
    if !is_urgent {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Entry {id} is not an active urgent note"
        ))));
    }

    let created = CommunicationLogRepo::dismiss(&state.pool, id, auth.user_id).await?;
    tracing::debug!(user_id = auth.user_id, entry_id = id, created, "Urgent note dismissed");

    Ok(StatusCode::NO_CONTENT)
}
