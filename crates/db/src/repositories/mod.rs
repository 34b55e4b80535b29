//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod communication_log_repo;
pub mod discount_item_repo;
pub mod exclusive_item_repo;
pub mod user_repo;

pub use communication_log_repo::CommunicationLogRepo;
pub use discount_item_repo::DiscountItemRepo;
pub use exclusive_item_repo::ExclusiveItemRepo;
pub use user_repo::UserRepo;
