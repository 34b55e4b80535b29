//! Communication log categories and the urgent-flag rule.
//!
//! `is_urgent` is never set directly: it is derived from the category on
//! every write, so `is_urgent == (category == "Urgent")` always holds.

use crate::error::CoreError;
use crate::roles::is_admin;

pub const CATEGORY_GENERAL: &str = "General";
pub const CATEGORY_REMINDER: &str = "Reminder";
pub const CATEGORY_URGENT: &str = "Urgent";

/// Maximum length of a category label.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Maximum length of a note body.
pub const MAX_NOTE_LEN: usize = 5000;

/// Event name used on the real-time stream for urgent notes.
pub const URGENT_NOTE_EVENT: &str = "urgent_note";

/// Normalize a category label.
///
/// Missing or blank categories default to [`CATEGORY_GENERAL`]. Any casing of
/// "urgent" is canonicalized so the urgent flag cannot be sidestepped.
pub fn normalize_category(category: Option<&str>) -> Result<String, CoreError> {
    let category = category.map(str::trim).unwrap_or("");
    if category.is_empty() {
        return Ok(CATEGORY_GENERAL.to_string());
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(CoreError::Validation(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }
    if category.eq_ignore_ascii_case(CATEGORY_URGENT) {
        return Ok(CATEGORY_URGENT.to_string());
    }
    Ok(category.to_string())
}

/// The derived urgent flag for a (normalized) category.
pub fn is_urgent_category(category: &str) -> bool {
    category == CATEGORY_URGENT
}

/// Only admins may author or move an entry into the Urgent category.
pub fn authorize_category(category: &str, role: &str) -> Result<(), CoreError> {
    if is_urgent_category(category) && !is_admin(role) {
        return Err(CoreError::Forbidden(
            "Only admins can post urgent notes".into(),
        ));
    }
    Ok(())
}

/// Validate and trim a note body.
pub fn validate_note(note: &str) -> Result<String, CoreError> {
    let note = note.trim();
    if note.is_empty() {
        return Err(CoreError::Validation("Note must not be empty".into()));
    }
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(CoreError::Validation(format!(
            "Note must be at most {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(note.to_string())
}
