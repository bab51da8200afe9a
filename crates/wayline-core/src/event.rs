//! Session lifecycle events published by the node's subsystems.
//!
//! Each payload type belongs to exactly one topic. Producers publish
//! independently, so no ordering holds across topics.

use serde::{Deserialize, Serialize};

use crate::id::{Identity, SessionId};
use crate::session::SessionInfo;

/// Event bus topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// Provider-side service session lifecycle.
    ServiceSession,
    /// Consumer-side connection session lifecycle.
    ConnectionSession,
    /// Consumer-side transfer counters.
    ConnectionStatistics,
    /// Micropayment invoice settled.
    InvoicePaid,
}

impl Topic {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceSession => "session-event",
            Self::ConnectionSession => "connection-session",
            Self::ConnectionStatistics => "connection-statistics",
            Self::InvoicePaid => "invoice-paid",
        }
    }
}

// ── Service session ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceSessionStatus {
    Created,
    Acknowledged,
    Removed,
}

/// Published by the service layer. Carries only the id: full context is
/// looked up from the service session table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSessionEvent {
    pub id: SessionId,
    pub status: ServiceSessionStatus,
}

// ── Connection session ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionSessionStatus {
    Created,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSessionEvent {
    pub status: ConnectionSessionStatus,
    pub session_info: SessionInfo,
}

// ── Statistics ───────────────────────────────────────────────────────────────

/// Absolute cumulative counters, not deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatisticsEvent {
    pub session_id: SessionId,
    pub stats: Statistics,
}

// ── Payments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub agreement_id: u64,
    /// Cumulative amount promised under this agreement so far.
    pub agreement_total: u64,
    #[serde(default)]
    pub transactor_fee: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePaidEvent {
    pub session_id: SessionId,
    pub consumer_id: Identity,
    pub invoice: Invoice,
}

// ── Tagged union ─────────────────────────────────────────────────────────────

/// Any event the history component consumes, tagged by topic. Used where
/// events cross a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "event", rename_all = "kebab-case")]
pub enum NodeEvent {
    ServiceSession(ServiceSessionEvent),
    ConnectionSession(ConnectionSessionEvent),
    ConnectionStatistics(ConnectionStatisticsEvent),
    InvoicePaid(InvoicePaidEvent),
}

impl NodeEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::ServiceSession(_) => Topic::ServiceSession,
            Self::ConnectionSession(_) => Topic::ConnectionSession,
            Self::ConnectionStatistics(_) => Topic::ConnectionStatistics,
            Self::InvoicePaid(_) => Topic::InvoicePaid,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::ServiceSession(e) => &e.id,
            Self::ConnectionSession(e) => &e.session_info.session_id,
            Self::ConnectionStatistics(e) => &e.session_id,
            Self::InvoicePaid(e) => &e.session_id,
        }
    }
}
