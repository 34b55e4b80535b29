//! Handlers for the `/exclusive-items` resource (red tag markdown ladder).
//!
//! Every read first runs the promotion sweep so week 4 items that have aged
//! past the color-cycle threshold are reported at week 5. A failed sweep is
//! logged and the read continues with stored values.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use redtag_core::error::CoreError;
use redtag_core::markdown::{
    parse_price, parse_week, validate_category, validate_price, validate_week_transition,
    COLOR_CYCLE_WEEK, PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS,
};
use redtag_core::types::{Date, DbId};
use redtag_db::models::exclusive_item::{
    BulkUpdateOutcome, BulkUpdateRequest, CreateExclusiveItem, ExclusiveItem, ExclusiveItemAlert,
    ExclusiveItemListParams, UpdateExclusiveItem,
};
use redtag_db::repositories::{ExclusiveItemRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::multipart::{store_all, ItemForm};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "ExclusiveItem";

/// Multipart field names accepted for the item photo.
const IMAGE_FIELDS: &[&str] = &["image", "file"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> Date {
    chrono::Utc::now().date_naive()
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// Promote every week 4 item old enough for color cycle.
///
/// Never fails the caller: a database error here is logged and the request
/// proceeds against the stored weeks.
async fn run_sweep(state: &AppState) {
    match ExclusiveItemRepo::promote_due(&state.pool, today(), PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS)
        .await
    {
        Ok(0) => {}
        Ok(promoted) => tracing::info!(promoted, "Promoted items to color cycle"),
        Err(e) => tracing::warn!(error = %e, "Color-cycle sweep failed; serving stored weeks"),
    }
}

async fn find_live(state: &AppState, id: DbId) -> AppResult<ExclusiveItem> {
    ExclusiveItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn required<'a>(form: &'a ItemForm, name: &str) -> AppResult<&'a str> {
    form.text(name).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Field '{name}' is required")))
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/exclusive-items?category=
///
/// All live items ordered by week, then newest arrival first.
pub async fn list_items(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExclusiveItemListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref category) = params.category {
        validate_category(category)?;
    }

    run_sweep(&state).await;
    let items = ExclusiveItemRepo::list(&state.pool, params.category.as_deref()).await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/exclusive-items/{id}
pub async fn get_item(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    run_sweep(&state).await;
    let item = find_live(&state, id).await?;
    Ok(Json(DataResponse { data: item }))
}

/// GET /api/v1/exclusive-items/alerts
///
/// Items in the caller's subscribed categories that are overdue for their
/// next markdown, plus every week 5 item in those categories.
pub async fn list_alerts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let subscriptions = user.subscriptions();
    if subscriptions.is_empty() {
        return Ok(Json(DataResponse { data: Vec::<ExclusiveItemAlert>::new() }));
    }

    run_sweep(&state).await;
    let alerts =
        ExclusiveItemRepo::list_alerts(&state.pool, &subscriptions.categories(), today()).await?;

    Ok(Json(DataResponse { data: alerts }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/exclusive-items (multipart)
///
/// Fields: `category`, `price`, optional `notes`, optional `image` file.
/// New items start at week 1 with today's arrival date.
pub async fn create_item(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = ItemForm::read(multipart).await?;

    let category = required(&form, "category")?.to_string();
    validate_category(&category)?;
    let price = parse_price(required(&form, "price")?)?;
    let notes = form.text("notes").map(str::to_string);
    let image = form.take_files(IMAGE_FIELDS).into_iter().next();

    let image_path = match image {
        Some(file) => store_all(&state.image_store, std::slice::from_ref(&file))
            .await?
            .pop(),
        None => None,
    };

    let input = CreateExclusiveItem {
        category,
        price,
        date_arrived: today(),
        notes,
        image_path: image_path.clone(),
        created_by: Some(auth.user_id),
    };

    let item = match ExclusiveItemRepo::create(&state.pool, &input).await {
        Ok(item) => item,
        Err(e) => {
            if let Some(ref path) = image_path {
                state.image_store.delete(path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        item_id = item.id,
        category = %item.category,
        "Exclusive item created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/exclusive-items/{id} (multipart)
///
/// Fields: `category`, `price`, `week` (1-5 or `color_cycle`), optional
/// `notes`, optional `image` file, optional `remove_image` flag. The week
/// may not move backwards.
pub async fn update_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = ItemForm::read(multipart).await?;

    let category = required(&form, "category")?.to_string();
    validate_category(&category)?;
    let price = parse_price(required(&form, "price")?)?;
    let week = parse_week(required(&form, "week")?)?;
    let notes = form.text("notes").map(str::to_string);
    let clear_image = form.flag("remove_image");
    let image = form.take_files(IMAGE_FIELDS).into_iter().next();

    run_sweep(&state).await;
    let existing = find_live(&state, id).await?;
    validate_week_transition(existing.week, week)?;

    let new_image = match image {
        Some(file) if !clear_image => store_all(&state.image_store, std::slice::from_ref(&file))
            .await?
            .pop(),
        _ => None,
    };

    let input = UpdateExclusiveItem {
        category,
        price,
        week,
        notes,
        image_path: new_image.clone(),
        clear_image,
    };

    let updated = match ExclusiveItemRepo::update(&state.pool, id, &input).await {
        Ok(Some(item)) => item,
        outcome => {
            if let Some(ref path) = new_image {
                state.image_store.delete(path).await;
            }
            outcome?;
            // The row vanished or moved ahead between the read and the write.
            return Err(match ExclusiveItemRepo::find_by_id(&state.pool, id).await? {
                Some(current) => {
                    validate_week_transition(current.week, week)?;
                    AppError::Core(CoreError::Conflict(format!(
                        "{ENTITY} {id} changed concurrently; retry the update"
                    )))
                }
                None => not_found(id),
            });
        }
    };

    if let Some(old) = existing.image_path {
        if updated.image_path.as_deref() != Some(old.as_str()) {
            state.image_store.delete(&old).await;
        }
    }

    tracing::info!(
        user_id = auth.user_id,
        item_id = id,
        week = updated.week,
        "Exclusive item updated"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// PUT /api/v1/exclusive-items/bulk
///
/// Apply `{id, price, week}` to several items at once. Every entry is
/// validated before any write; the batch commits all-or-nothing.
pub async fn bulk_update(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkUpdateRequest>,
) -> AppResult<impl IntoResponse> {
    if input.items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one item is required".into(),
        )));
    }

    let entries = input
        .items
        .iter()
        .map(|entry| -> Result<_, CoreError> {
            Ok((entry.id, validate_price(entry.price)?, entry.week.normalize()?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    run_sweep(&state).await;

    match ExclusiveItemRepo::bulk_update(&state.pool, &entries).await? {
        BulkUpdateOutcome::Updated(items) => {
            tracing::info!(user_id = auth.user_id, count = items.len(), "Bulk item update");
            Ok(Json(DataResponse { data: items }))
        }
        BulkUpdateOutcome::Missing(id) => Err(not_found(id)),
        BulkUpdateOutcome::Regressed { id, current_week } => {
            tracing::debug!(item_id = id, current_week, "Bulk update rejected: week regression");
            Err(AppError::Core(CoreError::Conflict(format!(
                "{ENTITY} {id} is already at week {current_week}; weeks cannot move backwards"
            ))))
        }
    }
}

/// DELETE /api/v1/exclusive-items/{id}
pub async fn delete_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ExclusiveItemRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, item_id = id, "Exclusive item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/exclusive-items/{id}/confirm-color-cycle
///
/// Confirm a week 5 item has physically gone to color cycle and take it
/// off the ladder.
pub async fn confirm_color_cycle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    run_sweep(&state).await;

    if ExclusiveItemRepo::move_to_color_cycle(&state.pool, id)
        .await?
        .is_none()
    {
        let current = find_live(&state, id).await?;
        return Err(AppError::Core(CoreError::Conflict(format!(
            "{ENTITY} {id} is at week {}; only week {COLOR_CYCLE_WEEK} items can be moved to color cycle",
            current.week
        ))));
    }

    tracing::info!(user_id = auth.user_id, item_id = id, "Item moved to color cycle");
    Ok(StatusCode::NO_CONTENT)
}
