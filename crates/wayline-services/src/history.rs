//! Session history. Merges session lifecycle events from independent
//! producers into one durable record per session.
//!
//! In-flight records live in the active table until the session ends.
//! They reach storage at two transitions:
//! - created: first `store` with status New
//! - ended:   final `update` with status Completed, then the entry is dropped
//!
//! Invoice payments are written through with `update`.
//! Statistics only refresh the in-memory copy; the next persisted write
//! carries them. Events for sessions not in the table are logged and dropped.
//! Storage failures are logged and leave the table as it was.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use wayline_core::config::DEFAULT_HISTORY_COLLECTION;
use wayline_core::{
    ConnectionSessionEvent, ConnectionSessionStatus, ConnectionStatisticsEvent, HistoryRecord,
    InvoicePaidEvent, ServiceSessionEvent, ServiceSessionStatus, SessionId, Status,
};

use crate::bus::{BusError, Subscriber};
use crate::lookup::SessionFinder;
use crate::store::{StoreError, Storer, StorerExt};

/// Source of wall-clock time for `updated` stamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

type ActiveTable = HashMap<SessionId, HistoryRecord>;

pub struct SessionHistory {
    storage: Arc<dyn Storer>,
    current_sessions: Arc<dyn SessionFinder>,
    collection: String,
    clock: Clock,
    active: RwLock<ActiveTable>,
}

impl SessionHistory {
    pub fn new(storage: Arc<dyn Storer>, current_sessions: Arc<dyn SessionFinder>) -> Self {
        Self {
            storage,
            current_sessions,
            collection: DEFAULT_HISTORY_COLLECTION.to_string(),
            clock: Arc::new(Utc::now),
            active: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Register all four consumers. Fails on the first rejected subscription.
    pub fn subscribe<B: Subscriber>(self: &Arc<Self>, bus: &B) -> Result<(), BusError> {
        let repo = Arc::clone(self);
        bus.subscribe(move |e: &ServiceSessionEvent| repo.consume_service_session_event(e))?;
        let repo = Arc::clone(self);
        bus.subscribe(move |e: &ConnectionSessionEvent| repo.consume_connection_session_event(e))?;
        let repo = Arc::clone(self);
        bus.subscribe(move |e: &ConnectionStatisticsEvent| {
            repo.consume_connection_statistics_event(e)
        })?;
        let repo = Arc::clone(self);
        bus.subscribe(move |e: &InvoicePaidEvent| repo.consume_invoice_paid_event(e))?;
        tracing::info!(collection = %self.collection, "session history subscribed");
        Ok(())
    }

    /// Every persisted record. Sessions not yet stored are not included.
    pub fn get_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        self.storage.get_all_from(&self.collection)
    }

    /// Number of in-flight sessions.
    pub fn active_count(&self) -> usize {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of an in-flight record.
    pub fn active(&self, id: &SessionId) -> Option<HistoryRecord> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    // A panic inside a critical section leaves the map itself intact.
    fn table(&self) -> RwLockWriteGuard<'_, ActiveTable> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    // ── Consumers ────────────────────────────────────────────────────────────

    fn consume_service_session_event(&self, e: &ServiceSessionEvent) {
        let Some(session) = self.current_sessions.find(&e.id) else {
            tracing::warn!(session_id = %e.id, "received an unknown service session update");
            return;
        };

        let mut record = HistoryRecord::from_service_session(&session);
        let mut active = self.table();
        if let Some(previous) = active.get(&e.id) {
            record.status = previous.status;
            record.updated = previous.updated;
        }
        active.insert(e.id.clone(), record);

        match e.status {
            ServiceSessionStatus::Removed => self.end_session(&mut active, &e.id),
            ServiceSessionStatus::Created => self.create_session(&mut active, &e.id),
            ServiceSessionStatus::Acknowledged => {}
        }
    }

    fn consume_connection_session_event(&self, e: &ConnectionSessionEvent) {
        let session_id = &e.session_info.session_id;
        let mut active = self.table();

        match e.status {
            ConnectionSessionStatus::Ended => self.end_session(&mut active, session_id),
            ConnectionSessionStatus::Created => {
                // A repeated create keeps the in-flight counters and status.
                active
                    .entry(session_id.clone())
                    .or_insert_with(|| HistoryRecord::from_session_info(&e.session_info));
                self.create_session(&mut active, session_id);
            }
        }
    }

    fn consume_connection_statistics_event(&self, e: &ConnectionStatisticsEvent) {
        let mut active = self.table();
        let Some(row) = active.get_mut(&e.session_id) else {
            tracing::warn!(session_id = %e.session_id, "received statistics for an unknown session");
            return;
        };
        row.data_sent = e.stats.bytes_sent;
        row.data_received = e.stats.bytes_received;
    }

    fn consume_invoice_paid_event(&self, e: &InvoicePaidEvent) {
        let mut active = self.table();
        let Some(current) = active.get(&e.session_id) else {
            tracing::warn!(session_id = %e.session_id, "received a payment for an unknown session");
            return;
        };

        let total = e.invoice.agreement_total;
        if total < current.tokens {
            tracing::warn!(
                session_id = %e.session_id,
                total,
                tokens = current.tokens,
                "ignoring stale invoice"
            );
            return;
        }

        let mut row = current.clone();
        row.tokens = total;
        row.touch(self.now());
        // An upsert makes a record whose insert failed durable after all.
        row.status.get_or_insert(Status::New);

        if let Err(err) = self.storage.update(&self.collection, &row) {
            tracing::error!(session_id = %e.session_id, error = %err, "session update failed");
            return;
        }
        active.insert(e.session_id.clone(), row);
        tracing::debug!(session_id = %e.session_id, total, "session updated");
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    fn end_session(&self, active: &mut ActiveTable, session_id: &SessionId) {
        let Some(current) = active.get(session_id) else {
            tracing::warn!(session_id = %session_id, "can't find session to finish");
            return;
        };

        let mut row = current.clone();
        row.touch(self.now());
        row.status = Some(Status::Completed);

        if let Err(err) = self.storage.update(&self.collection, &row) {
            tracing::error!(session_id = %session_id, error = %err, "session final update failed");
            return;
        }

        active.remove(session_id);
        tracing::debug!(session_id = %session_id, "session updated with final data");
    }

    fn create_session(&self, active: &mut ActiveTable, session_id: &SessionId) {
        let Some(current) = active.get(session_id) else {
            tracing::warn!(session_id = %session_id, "can't find session to store");
            return;
        };
        if current.status == Some(Status::New) {
            tracing::debug!(session_id = %session_id, "session already stored");
            return;
        }

        let mut row = current.clone();
        row.touch(self.now());
        row.status = Some(Status::New);

        if let Err(err) = self.storage.store(&self.collection, &row) {
            tracing::error!(session_id = %session_id, error = %err, "session insert failed");
            return;
        }

        active.insert(session_id.clone(), row);
        tracing::debug!(session_id = %session_id, "session saved");
    }
}
