//! Service session table: the provider side's directory of live sessions.

use std::sync::Arc;

use dashmap::DashMap;

use wayline_core::{ServiceSession, SessionId};

/// Read-only view of currently active service sessions.
pub trait SessionFinder: Send + Sync {
    fn find(&self, id: &SessionId) -> Option<ServiceSession>;
}

/// The session table, shared across all tasks.
#[derive(Clone, Default)]
pub struct ServiceSessionTable {
    sessions: Arc<DashMap<SessionId, ServiceSession>>,
}

impl ServiceSessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a session, replacing any previous entry with the same id.
    pub fn insert(&self, session: ServiceSession) {
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn remove(&self, id: &SessionId) -> Option<ServiceSession> {
        self.sessions.remove(id).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionFinder for ServiceSessionTable {
    fn find(&self, id: &SessionId) -> Option<ServiceSession> {
        self.sessions.get(id).map(|s| s.clone())
    }
}
