//! /sessions and /service-sessions handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use wayline_core::{Direction, HistoryRecord, ServiceSession, SessionId, Status};

use super::{blocking, ApiError, ApiState};

// ── /sessions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SessionsQuery {
    pub direction: Option<Direction>,
    pub status: Option<Status>,
}

#[derive(Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<HistoryRecord>,
    pub count: usize,
}

pub async fn handle_sessions(
    State(state): State<ApiState>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let history = state.history.clone();
    let sessions: Vec<HistoryRecord> = blocking(move || history.get_all())
        .await?
        .into_iter()
        .filter(|r| query.direction.map_or(true, |d| r.direction == d))
        .filter(|r| query.status.map_or(true, |s| r.status == Some(s)))
        .collect();

    Ok(Json(SessionsResponse {
        count: sessions.len(),
        sessions,
    }))
}

// ── /service-sessions/{id} (PUT) ──────────────────────────────────────────────

#[derive(Serialize)]
pub struct ServiceSessionResponse {
    pub session_id: String,
    pub tracked: bool,
}

pub async fn handle_service_session_register(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(session): Json<ServiceSession>,
) -> Result<Json<ServiceSessionResponse>, ApiError> {
    if session.id.as_str() != session_id {
        return Err((
            StatusCode::BAD_REQUEST,
            "session id in path and body differ".to_string(),
        ));
    }
    state.service_sessions.insert(session);
    tracing::debug!(session_id = %session_id, "service session registered via API");

    Ok(Json(ServiceSessionResponse {
        session_id,
        tracked: true,
    }))
}

// ── /service-sessions/{id} (DELETE) ───────────────────────────────────────────

pub async fn handle_service_session_drop(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Json<ServiceSessionResponse> {
    let removed = state
        .service_sessions
        .remove(&SessionId::from(session_id.as_str()))
        .is_some();
    if removed {
        tracing::debug!(session_id = %session_id, "service session dropped via API");
    }

    Json(ServiceSessionResponse {
        session_id,
        tracked: false,
    })
}
