//! Request handlers, one module per resource.
//!
//! Handlers validate input with the `redtag_core` rules, delegate to the
//! repositories in `redtag_db`, and map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod auth;
pub mod communication_log;
pub mod discount_items;
pub mod exclusive_items;
pub mod multipart;
pub mod users;
