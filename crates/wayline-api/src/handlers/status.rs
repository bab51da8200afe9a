//! /status handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::{blocking, ApiError, ApiState};

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    /// Records in durable storage, finished or not.
    pub history_records: usize,
    /// Sessions currently tracked in memory.
    pub active_sessions: usize,
    pub service_sessions: usize,
}

pub async fn handle_status(State(state): State<ApiState>) -> Result<Json<StatusResponse>, ApiError> {
    let history = state.history.clone();
    let history_records = blocking(move || history.get_all().map(|all| all.len())).await?;

    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        history_records,
        active_sessions: state.history.active_count(),
        service_sessions: state.service_sessions.len(),
    }))
}
