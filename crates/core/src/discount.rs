//! Furniture discount approval lifecycle.
//!
//! `pending --approve(admin)--> approved`. Nothing leaves `approved`, and an
//! approved item's price, notes and images are frozen.

use crate::error::CoreError;
use crate::types::DbId;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";

/// All valid approval status values.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED];

/// Maximum length of the note an admin may attach when approving.
pub const MAX_APPROVAL_NOTE_LEN: usize = 1000;

/// Validate a status filter value.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid approval status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Edits are only allowed while the item is pending.
pub fn ensure_editable(id: DbId, status: &str) -> Result<(), CoreError> {
    if status == STATUS_APPROVED {
        return Err(CoreError::Forbidden(format!(
            "Discount item {id} is approved and can no longer be edited"
        )));
    }
    Ok(())
}

/// Approval is only allowed from pending.
pub fn ensure_approvable(id: DbId, status: &str) -> Result<(), CoreError> {
    if status == STATUS_APPROVED {
        return Err(CoreError::Conflict(format!(
            "Discount item {id} is already approved"
        )));
    }
    Ok(())
}

/// Trim an optional approval note; blank notes become `None`.
pub fn normalize_approval_note(note: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if note.chars().count() > MAX_APPROVAL_NOTE_LEN {
        return Err(CoreError::Validation(format!(
            "Approval note must be at most {MAX_APPROVAL_NOTE_LEN} characters"
        )));
    }
    Ok(Some(note.to_string()))
}
