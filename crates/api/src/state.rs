use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::ImageStore;
use crate::stream::StreamManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: redtag_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of open urgent-note streams.
    pub stream_manager: Arc<StreamManager>,
    /// Local image storage for item photos.
    pub image_store: Arc<ImageStore>,
}
