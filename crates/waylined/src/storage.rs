//! Storage engine selection.

use std::sync::Arc;

use anyhow::{Context, Result};

use wayline_core::config::{StorageBackend, StorageConfig};
use wayline_services::{MemoryStore, SqliteStore, Storer};

pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storer>> {
    match config.backend {
        StorageBackend::Sqlite => {
            let store = SqliteStore::open(&config.database_path).with_context(|| {
                format!(
                    "failed to open history database {}",
                    config.database_path.display()
                )
            })?;
            tracing::info!(path = %config.database_path.display(), "history database opened");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("memory storage selected, session history is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
