//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs and plain insert/update inputs

pub mod communication_log;
pub mod discount_item;
pub mod exclusive_item;
pub mod user;
