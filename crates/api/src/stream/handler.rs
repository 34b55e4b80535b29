use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use redtag_core::communication_log::URGENT_NOTE_EVENT;
use tokio_stream::wrappers::ReceiverStream;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::stream::manager::StreamManager;

/// Removes the connection from the registry when the response body is dropped.
struct ConnectionGuard {
    conn_id: String,
    manager: Arc<StreamManager>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = std::mem::take(&mut self.conn_id);
        let manager = Arc::clone(&self.manager);
        tracing::info!(conn_id = %conn_id, "Urgent-note stream disconnected");
        // Drop cannot await; hand the removal to the runtime.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { manager.remove(&conn_id).await });
        }
    }
}

/// GET /api/v1/communication-log/stream
///
/// Opens a Server-Sent Events stream. Every urgent note published after the
/// stream is registered arrives as one `urgent_note` event with a JSON
/// payload. Keep-alive comments are sent at the configured interval.
pub async fn stream_handler(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let rx = state.stream_manager.add(conn_id.clone(), auth.user_id).await;
    tracing::info!(conn_id = %conn_id, user_id = auth.user_id, "Urgent-note stream connected");

    let guard = ConnectionGuard {
        conn_id,
        manager: Arc::clone(&state.stream_manager),
    };

    let stream = ReceiverStream::new(rx).filter_map(move |note| {
        // The guard lives as long as the stream does.
        let _guard = &guard;
        let event = match SseEvent::default().event(URGENT_NOTE_EVENT).json_data(&note) {
            Ok(ev) => Some(Ok(ev)),
            Err(err) => {
                tracing::error!(entry_id = note.id, error = %err, "Failed to serialize urgent note");
                None
            }
        };
        futures::future::ready(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(state.config.stream_keepalive_secs))
            .text("keep-alive"),
    )
}
