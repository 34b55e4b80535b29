//! Markdown ladder rules for exclusive ("red tag") inventory.
//!
//! An exclusive item arrives at week 1 and is walked down the ladder by
//! staff until it reaches week 5, the "color cycle" stage. Exactly one
//! transition happens without staff involvement: an item sitting at week 4
//! for [`PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS`] days is promoted to week 5.
//!
//! The alert thresholds and the promotion threshold are independent
//! constants; they are not derived from each other.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub const CATEGORY_FURNITURE: &str = "Furniture";
pub const CATEGORY_CLOTHING: &str = "Clothing";
pub const CATEGORY_BRIC_A_BRAC: &str = "Bric-a-Brac";

/// The closed set of exclusive item categories.
pub const VALID_CATEGORIES: &[&str] = &[CATEGORY_FURNITURE, CATEGORY_CLOTHING, CATEGORY_BRIC_A_BRAC];

/// Validate that `category` is one of [`VALID_CATEGORIES`] (case-sensitive).
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Weeks
// ---------------------------------------------------------------------------

/// Week assigned to every newly arrived item.
pub const FIRST_WEEK: i32 = 1;

/// Terminal week: ready for color-cycle liquidation.
pub const COLOR_CYCLE_WEEK: i32 = 5;

/// The only week the automatic sweep promotes from.
pub const PROMOTION_SOURCE_WEEK: i32 = 4;

/// Input value meaning "send straight to color cycle". Normalized to
/// [`COLOR_CYCLE_WEEK`]; it never deletes the item.
pub const COLOR_CYCLE_SENTINEL: &str = "color_cycle";

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Week 1 items need attention after this many days.
pub const ALERT_AFTER_DAYS_WEEK_1: i64 = 7;

/// Week 2 items need attention after this many days.
pub const ALERT_AFTER_DAYS_WEEK_2: i64 = 14;

/// Week 3 items need attention after this many days.
pub const ALERT_AFTER_DAYS_WEEK_3: i64 = 21;

/// Week 4 items are promoted to week 5 after this many days.
pub const PROMOTE_TO_COLOR_CYCLE_AFTER_DAYS: i64 = 28;

/// Validate a numeric week value.
pub fn validate_week(week: i32) -> Result<i32, CoreError> {
    if (FIRST_WEEK..=COLOR_CYCLE_WEEK).contains(&week) {
        Ok(week)
    } else {
        Err(CoreError::Validation(format!(
            "Invalid week {week}. Must be between {FIRST_WEEK} and {COLOR_CYCLE_WEEK} \
             or '{COLOR_CYCLE_SENTINEL}'"
        )))
    }
}

/// Staff edits may hold or advance the week but never move it backwards.
pub fn validate_week_transition(current: i32, requested: i32) -> Result<(), CoreError> {
    if requested < current {
        return Err(CoreError::Conflict(format!(
            "Cannot move an item back from week {current} to week {requested}"
        )));
    }
    Ok(())
}

/// Parse a week from a text field (multipart forms send everything as text).
pub fn parse_week(raw: &str) -> Result<i32, CoreError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(COLOR_CYCLE_SENTINEL) {
        return Ok(COLOR_CYCLE_WEEK);
    }
    let week: i32 = raw
        .parse()
        .map_err(|_| CoreError::Validation(format!("Invalid week '{raw}'")))?;
    validate_week(week)
}

/// A week as it arrives in a JSON body: either a number or the sentinel.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeekInput {
    Number(i32),
    Label(String),
}

impl WeekInput {
    /// Resolve to a stored week value in `1..=5`.
    pub fn normalize(&self) -> Result<i32, CoreError> {
        match self {
            WeekInput::Number(week) => validate_week(*week),
            WeekInput::Label(label) => parse_week(label),
        }
    }
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

/// Largest price the `NUMERIC(10,2)` price columns can hold.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Validate a price and round it to currency precision.
pub fn validate_price(price: Decimal) -> Result<Decimal, CoreError> {
    if price.is_sign_negative() {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    let price = price.round_dp(2);
    if price > MAX_PRICE {
        return Err(CoreError::Validation(format!(
            "Price must not exceed {MAX_PRICE}"
        )));
    }
    Ok(price)
}

/// Parse a price from a text field. Missing or non-numeric input is rejected.
pub fn parse_price(raw: &str) -> Result<Decimal, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::Validation("Price is required".into()));
    }
    let price: Decimal = raw
        .parse()
        .map_err(|_| CoreError::Validation(format!("Invalid price '{raw}'")))?;
    validate_price(price)
}

// ---------------------------------------------------------------------------
// Aging
// ---------------------------------------------------------------------------

/// Minimum age in days after which an item at `week` shows up in alerts.
///
/// Week 5 items always need attention (`Some(0)`); week 4 items never
/// alert because the sweep handles them.
pub fn alert_threshold_days(week: i32) -> Option<i64> {
    match week {
        1 => Some(ALERT_AFTER_DAYS_WEEK_1),
        2 => Some(ALERT_AFTER_DAYS_WEEK_2),
        3 => Some(ALERT_AFTER_DAYS_WEEK_3),
        COLOR_CYCLE_WEEK => Some(0),
        _ => None,
    }
}

/// Every `(week, threshold)` pair that can raise an alert, week ascending.
///
/// The alert query binds these pairs, so this table is the single source
/// of the alert rules.
pub fn alert_thresholds() -> Vec<(i32, i64)> {
    (FIRST_WEEK..=COLOR_CYCLE_WEEK)
        .filter_map(|week| alert_threshold_days(week).map(|days| (week, days)))
        .collect()
}

// ---------------------------------------------------------------------------
// Alert subscriptions
// ---------------------------------------------------------------------------

/// A user's per-category alert subscription flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertSubscriptions {
    pub furniture: bool,
    pub clothing: bool,
    pub bric_a_brac: bool,
}

impl AlertSubscriptions {
    /// Categories the user is subscribed to, in [`VALID_CATEGORIES`] order.
    pub fn categories(&self) -> Vec<&'static str> {
        [
            (self.furniture, CATEGORY_FURNITURE),
            (self.clothing, CATEGORY_CLOTHING),
            (self.bric_a_brac, CATEGORY_BRIC_A_BRAC),
        ]
        .into_iter()
        .filter_map(|(enabled, category)| enabled.then_some(category))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.furniture || self.clothing || self.bric_a_brac)
    }
}
