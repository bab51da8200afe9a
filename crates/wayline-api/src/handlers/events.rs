//! /events handler. Ingress for subsystems running out of process.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use wayline_core::NodeEvent;
use wayline_services::publish_node_event;

use super::ApiState;

#[derive(Serialize)]
pub struct EventAccepted {
    pub topic: &'static str,
    pub session_id: String,
}

/// Publish on a blocking worker and return immediately. Outcomes are only
/// visible in the daemon log.
pub async fn handle_publish_event(
    State(state): State<ApiState>,
    Json(event): Json<NodeEvent>,
) -> (StatusCode, Json<EventAccepted>) {
    let accepted = EventAccepted {
        topic: event.topic().name(),
        session_id: event.session_id().to_string(),
    };
    tracing::debug!(topic = accepted.topic, session_id = %accepted.session_id, "event received via API");

    let bus = state.bus.clone();
    tokio::task::spawn_blocking(move || publish_node_event(&bus, event));

    (StatusCode::ACCEPTED, Json(accepted))
}
