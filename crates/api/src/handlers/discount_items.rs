//! Handlers for the `/discount-items` resource (furniture approval).
//!
//! Items are created pending and become read-only once an admin approves
//! them. Soft delete is allowed in either status.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use redtag_core::discount::{
    ensure_approvable, ensure_editable, normalize_approval_note, validate_status,
};
use redtag_core::error::CoreError;
use redtag_core::markdown::parse_price;
use redtag_core::types::DbId;
use redtag_db::models::discount_item::{
    ApproveDiscountItem, CreateDiscountItem, DiscountItem, DiscountItemListParams,
    UpdateDiscountItem,
};
use redtag_db::repositories::DiscountItemRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::multipart::{store_all, ItemForm};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "DiscountItem";

/// Multipart field names accepted for item photos.
const IMAGE_FIELDS: &[&str] = &["images", "images[]", "image"];

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

async fn find_live(state: &AppState, id: DbId) -> AppResult<DiscountItem> {
    DiscountItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/discount-items?status=
pub async fn list_items(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DiscountItemListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref status) = params.status {
        validate_status(status)?;
    }
    let items = DiscountItemRepo::list(&state.pool, params.status.as_deref()).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/discount-items/{id}
pub async fn get_item(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = find_live(&state, id).await?;
    Ok(Json(DataResponse { data: item }))
}

/// POST /api/v1/discount-items (multipart)
///
/// Fields: one or more `images` files, `price`, optional `notes`.
pub async fn create_item(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = ItemForm::read(multipart).await?;

    let price = parse_price(form.text("price").unwrap_or(""))?;
    let notes = form.text("notes").map(str::to_string);
    let files = form.take_files(IMAGE_FIELDS);
    if files.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one image is required".into(),
        )));
    }

    let image_paths = store_all(&state.image_store, &files).await?;

    let input = CreateDiscountItem {
        image_paths,
        price,
        notes,
        created_by: Some(auth.user_id),
    };

    let item = match DiscountItemRepo::create(&state.pool, &input).await {
        Ok(item) => item,
        Err(e) => {
            state.image_store.delete_all(&input.image_paths).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        item_id = item.id,
        images = item.image_paths.len(),
        "Discount item submitted for approval"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/discount-items/{id} (multipart)
///
/// Optional fields: `price`, `notes`, additional `images`. Rejected with 403
/// once the item is approved.
pub async fn update_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = ItemForm::read(multipart).await?;

    let price = form.text("price").map(parse_price).transpose()?;
    let notes = form.text("notes").map(str::to_string);
    let files = form.take_files(IMAGE_FIELDS);

    let existing = find_live(&state, id).await?;
    ensure_editable(id, &existing.approval_status)?;

    let staged = store_all(&state.image_store, &files).await?;
    let input = UpdateDiscountItem {
        price,
        notes,
        append_image_paths: staged,
    };

    let updated = match DiscountItemRepo::update_pending(&state.pool, id, &input).await {
        Ok(Some(item)) => item,
        outcome => {
            state.image_store.delete_all(&input.append_image_paths).await;
            outcome?;
            // Approved or deleted between the read and the write.
            let current = find_live(&state, id).await?;
            ensure_editable(id, &current.approval_status)?;
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{ENTITY} {id} changed concurrently; retry the update"
            ))));
        }
    };

    tracing::info!(user_id = auth.user_id, item_id = id, "Discount item updated");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/discount-items/{id}/approve
///
/// Admin only. Optional JSON body `{ "approval_note": "..." }`.
pub async fn approve_item(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Option<Json<ApproveDiscountItem>>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.unwrap_or_default();
    let note = normalize_approval_note(input.approval_note.as_deref())?;

    let approved = match DiscountItemRepo::approve(&state.pool, id, admin.user_id, note.as_deref())
        .await?
    {
        Some(item) => item,
        None => {
            let current = find_live(&state, id).await?;
            ensure_approvable(id, &current.approval_status)?;
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{ENTITY} {id} changed concurrently; retry the approval"
            ))));
        }
    };

    tracing::info!(user_id = admin.user_id, item_id = id, "Discount item approved");
    Ok(Json(DataResponse { data: approved }))
}

/// DELETE /api/v1/discount-items/{id}
pub async fn delete_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let removed = DiscountItemRepo::soft_delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        user_id = auth.user_id,
        item_id = id,
        status = %removed.approval_status,
        "Discount item deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
