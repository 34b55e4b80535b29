//! Server-Sent Events infrastructure for urgent-note delivery.
//!
//! Provides the connection registry shared through `AppState` and the
//! streaming handler mounted on the communication log routes.

mod handler;
pub mod manager;

pub use handler::stream_handler;
pub use manager::StreamManager;
