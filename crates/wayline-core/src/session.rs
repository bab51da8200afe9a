//! Session context as seen by the service and connection layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{Address, Identity, SessionId};

/// Where a service is offered from. Best-effort, may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
}

/// The offer a session was established against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Provider account address, as announced.
    pub provider_id: String,
    /// Service tag, e.g. "wireguard", "openvpn".
    pub service_type: String,
    #[serde(default)]
    pub location: Location,
}

impl Proposal {
    pub fn provider_identity(&self) -> Identity {
        Identity::from_address(&self.provider_id)
    }
}

/// Cumulative bytes moved through a session, from the provider's side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransferred {
    pub up: u64,
    pub down: u64,
}

/// A provider-side session as tracked by the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSession {
    pub id: SessionId,
    pub consumer_id: Identity,
    pub accountant_id: Address,
    pub proposal: Proposal,
    #[serde(default)]
    pub data_transferred: DataTransferred,
    #[serde(default)]
    pub tokens_earned: u64,
    pub created_at: DateTime<Utc>,
}

/// Session details embedded in consumer-side connection events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub consumer_id: Identity,
    pub accountant_id: Address,
    pub proposal: Proposal,
    pub started_at: DateTime<Utc>,
}
