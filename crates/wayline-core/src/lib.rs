//! wayline-core: shared types for session history: identifiers, the
//! history record, lifecycle events, and configuration.
//! All other Wayline crates depend on this one.

pub mod config;
pub mod event;
pub mod history;
pub mod id;
pub mod session;

pub use event::{
    ConnectionSessionEvent, ConnectionSessionStatus, ConnectionStatisticsEvent, InvoicePaidEvent,
    NodeEvent, ServiceSessionEvent, ServiceSessionStatus, Topic,
};
pub use history::{Direction, HistoryRecord, Status};
pub use id::{Address, AddressError, Identity, SessionId};
pub use session::{DataTransferred, Location, Proposal, ServiceSession, SessionInfo};
