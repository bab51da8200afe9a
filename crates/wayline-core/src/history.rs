//! Session history record, the persisted summary of one session's
//! identity, usage, and settlement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{Identity, SessionId};
use crate::session::{ServiceSession, SessionInfo};

/// Which role this node played in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// This node provided the service.
    Provider,
    /// This node consumed the service.
    Consumer,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Consumer => "consumer",
        }
    }
}

/// Lifecycle stage of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Stored on session creation, session still running.
    New,
    /// Final write made when the session ended.
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub session_id: SessionId,
    pub direction: Direction,
    pub consumer_id: Identity,
    pub provider_id: Identity,
    /// Accountant address in canonical hex form.
    pub accountant_id: String,
    pub service_type: String,
    pub provider_country: String,
    pub data_sent: u64,
    pub data_received: u64,
    pub tokens: u64,
    /// `None` until the record has been written to storage once.
    pub status: Option<Status>,
    pub started: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl HistoryRecord {
    /// Hydrate a provider-side record from the service layer's session.
    pub fn from_service_session(session: &ServiceSession) -> Self {
        let started = session.created_at;
        Self {
            session_id: session.id.clone(),
            direction: Direction::Provider,
            consumer_id: session.consumer_id.clone(),
            provider_id: session.proposal.provider_identity(),
            accountant_id: session.accountant_id.to_hex(),
            service_type: session.proposal.service_type.clone(),
            provider_country: session.proposal.location.country.clone(),
            data_sent: session.data_transferred.up,
            data_received: session.data_transferred.down,
            tokens: session.tokens_earned,
            status: None,
            started,
            updated: started,
        }
    }

    /// Build a consumer-side record from a connection event's session info.
    /// Counters start at zero.
    pub fn from_session_info(info: &SessionInfo) -> Self {
        let started = info.started_at;
        Self {
            session_id: info.session_id.clone(),
            direction: Direction::Consumer,
            consumer_id: info.consumer_id.clone(),
            provider_id: info.proposal.provider_identity(),
            accountant_id: info.accountant_id.to_hex(),
            service_type: info.proposal.service_type.clone(),
            provider_country: info.proposal.location.country.clone(),
            data_sent: 0,
            data_received: 0,
            tokens: 0,
            status: None,
            started,
            updated: started,
        }
    }

    /// Stamp the record for a persisted write. `updated` never moves backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated {
            self.updated = now;
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.status.is_some()
    }
}
