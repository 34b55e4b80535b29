//! Domain rules shared by the repository and HTTP layers.
//!
//! This crate has no I/O: every function here is a pure transformation or
//! validation so it can be unit-tested without a database.

pub mod communication_log;
pub mod discount;
pub mod error;
pub mod markdown;
pub mod pagination;
pub mod roles;
pub mod types;
