//! HTTP API handlers. Exposes session history and event ingress as JSON.

pub mod events;
pub mod sessions;
pub mod status;

use std::sync::Arc;

use axum::http::StatusCode;

use wayline_services::{EventBus, ServiceSessionTable, SessionHistory};

#[derive(Clone)]
pub struct ApiState {
    pub history: Arc<SessionHistory>,
    pub bus: EventBus,
    /// Lookup table the provider-side service layer feeds.
    pub service_sessions: ServiceSessionTable,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

pub type ApiError = (StatusCode, String);

/// Run blocking storage work off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, wayline_services::StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %e, "storage read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

// Re-export handler functions for use in router setup.
pub use events::handle_publish_event;
pub use sessions::{
    handle_service_session_drop, handle_service_session_register, handle_sessions,
};
pub use status::handle_status;
