//! wayline-services: session history reconciliation and the ports it
//! talks to: persistence, event bus, and the service session table.

pub mod bus;
pub mod history;
pub mod lookup;
pub mod sqlite;
pub mod store;

pub use bus::{publish_node_event, BusError, Event, EventBus, Publisher, Subscriber};
pub use history::{Clock, SessionHistory};
pub use lookup::{ServiceSessionTable, SessionFinder};
pub use sqlite::SqliteStore;
pub use store::{Keyed, MemoryStore, StoreError, Storer, StorerExt};
