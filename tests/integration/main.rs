//! Wayline integration test harness.
//!
//! Each test builds a node in-process: sqlite storage in a temp dir, an
//! event bus, a service session table, and the session history wired to
//! the bus. Events are published the way the node's subsystems would.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{TimeZone, Utc};

use wayline_core::event::{Invoice, Statistics};
use wayline_core::{
    Address, ConnectionSessionEvent, ConnectionSessionStatus, ConnectionStatisticsEvent,
    HistoryRecord, Identity, InvoicePaidEvent, Location, Proposal, ServiceSession,
    ServiceSessionEvent, ServiceSessionStatus, SessionId, SessionInfo,
};
use wayline_services::{EventBus, ServiceSessionTable, SessionHistory, SqliteStore};

mod concurrency;
mod durability;
mod lifecycle;

// ── Harness ───────────────────────────────────────────────────────────────────

pub struct Node {
    pub bus: EventBus,
    pub history: Arc<SessionHistory>,
    pub service_sessions: ServiceSessionTable,
}

impl Node {
    /// Start a node on the database at `path`.
    pub fn start(path: &Path) -> Result<Self> {
        let storage = Arc::new(SqliteStore::open(path)?);
        let service_sessions = ServiceSessionTable::new();
        let history = Arc::new(SessionHistory::new(
            storage,
            Arc::new(service_sessions.clone()),
        ));
        let bus = EventBus::new();
        history.subscribe(&bus)?;
        Ok(Self {
            bus,
            history,
            service_sessions,
        })
    }

    pub fn persisted(&self, id: &str) -> Result<Option<HistoryRecord>> {
        Ok(self
            .history
            .get_all()?
            .into_iter()
            .find(|r| r.session_id.as_str() == id))
    }
}

pub fn db_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("wayline.db")
}

// ── Event builders ────────────────────────────────────────────────────────────

pub fn proposal(provider: &str, service_type: &str) -> Proposal {
    Proposal {
        provider_id: provider.to_string(),
        service_type: service_type.to_string(),
        location: Location {
            country: "NL".to_string(),
        },
    }
}

pub fn started_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
}

pub fn connection(id: &str, status: ConnectionSessionStatus) -> ConnectionSessionEvent {
    ConnectionSessionEvent {
        status,
        session_info: SessionInfo {
            session_id: SessionId::from(id),
            consumer_id: Identity::new("0xAA"),
            accountant_id: Address::from_bytes([0x42; 20]),
            proposal: proposal("0xBB", "wireguard"),
            started_at: started_at(),
        },
    }
}

pub fn stats(id: &str, sent: u64, received: u64) -> ConnectionStatisticsEvent {
    ConnectionStatisticsEvent {
        session_id: SessionId::from(id),
        stats: Statistics {
            bytes_sent: sent,
            bytes_received: received,
        },
    }
}

pub fn paid(id: &str, total: u64) -> InvoicePaidEvent {
    InvoicePaidEvent {
        session_id: SessionId::from(id),
        consumer_id: Identity::new("0xaa"),
        invoice: Invoice {
            agreement_id: 7,
            agreement_total: total,
            transactor_fee: 1,
        },
    }
}

pub fn service_session(id: &str) -> ServiceSession {
    ServiceSession {
        id: SessionId::from(id),
        consumer_id: Identity::new("0xcc"),
        accountant_id: Address::from_bytes([0x42; 20]),
        proposal: proposal("0xDD", "openvpn"),
        data_transferred: Default::default(),
        tokens_earned: 0,
        created_at: started_at(),
    }
}

pub fn service(id: &str, status: ServiceSessionStatus) -> ServiceSessionEvent {
    ServiceSessionEvent {
        id: SessionId::from(id),
        status,
    }
}
