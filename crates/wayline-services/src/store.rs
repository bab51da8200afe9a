//! Persistence port: a keyed document store split into named collections.
//!
//! Engines implement [`Storer`] over raw JSON documents; callers use the
//! typed operations on [`StorerExt`].

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use wayline_core::HistoryRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {key} already exists in {collection}")]
    Duplicate { collection: String, key: String },
    #[error("failed to serialize record: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialize(serde_json::Error),
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Raw document store. Object safe so engines can be swapped at startup.
pub trait Storer: Send + Sync {
    /// Insert a new document. Fails with [`StoreError::Duplicate`] if the key exists.
    fn insert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError>;

    /// Insert or replace the document under `key`. Replacing keeps the
    /// document's original storage position.
    fn upsert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError>;

    /// All documents of a collection in storage order.
    fn scan(&self, collection: &str) -> Result<Vec<Vec<u8>>, StoreError>;
}

/// A record with a storage key.
pub trait Keyed {
    fn key(&self) -> String;
}

impl Keyed for HistoryRecord {
    fn key(&self) -> String {
        self.session_id.to_string()
    }
}

/// Typed operations over any [`Storer`].
pub trait StorerExt: Storer {
    /// Create a record.
    fn store<T: Keyed + Serialize>(&self, collection: &str, record: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_vec(record).map_err(StoreError::Serialize)?;
        self.insert(collection, &record.key(), &doc)
    }

    /// Upsert a record by key.
    fn update<T: Keyed + Serialize>(&self, collection: &str, record: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_vec(record).map_err(StoreError::Serialize)?;
        self.upsert(collection, &record.key(), &doc)
    }

    /// Read every record of a collection.
    fn get_all_from<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, StoreError> {
        self.scan(collection)?
            .iter()
            .map(|doc| serde_json::from_slice(doc).map_err(StoreError::Deserialize))
            .collect()
    }
}

impl<S: Storer + ?Sized> StorerExt for S {}

// ── In-memory engine ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Collection {
    order: Vec<String>,
    docs: HashMap<String, Vec<u8>>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<DashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.order.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl Storer for MemoryStore {
    fn insert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError> {
        let mut entry = self.collections.entry(collection.to_string()).or_default();
        if entry.docs.contains_key(key) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }
        entry.order.push(key.to_string());
        entry.docs.insert(key.to_string(), doc.to_vec());
        Ok(())
    }

    fn upsert(&self, collection: &str, key: &str, doc: &[u8]) -> Result<(), StoreError> {
        let mut entry = self.collections.entry(collection.to_string()).or_default();
        if entry.docs.insert(key.to_string(), doc.to_vec()).is_none() {
            entry.order.push(key.to_string());
        }
        Ok(())
    }

    fn scan(&self, collection: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|c| {
                c.order
                    .iter()
                    .filter_map(|key| c.docs.get(key).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        n: u32,
    }

    impl Keyed for Row {
        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn row(id: &str, n: u32) -> Row {
        Row { id: id.to_string(), n }
    }

    #[test]
    fn store_rejects_duplicate_keys() {
        let store = MemoryStore::new();
        store.store("rows", &row("a", 1)).unwrap();

        let err = store.store("rows", &row("a", 2)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        let rows: Vec<Row> = store.get_all_from("rows").unwrap();
        assert_eq!(rows, vec![row("a", 1)]);
    }

    #[test]
    fn update_replaces_in_place() {
        let store = MemoryStore::new();
        store.store("rows", &row("a", 1)).unwrap();
        store.store("rows", &row("b", 1)).unwrap();
        store.update("rows", &row("a", 5)).unwrap();

        let rows: Vec<Row> = store.get_all_from("rows").unwrap();
        assert_eq!(rows, vec![row("a", 5), row("b", 1)]);
    }

    #[test]
    fn update_inserts_missing_keys() {
        let store = MemoryStore::new();
        store.update("rows", &row("z", 9)).unwrap();
        assert_eq!(store.len("rows"), 1);
    }

    #[test]
    fn collections_are_isolated() {
        let store = MemoryStore::new();
        store.store("left", &row("a", 1)).unwrap();
        store.store("right", &row("a", 2)).unwrap();

        assert_eq!(store.len("left"), 1);
        assert_eq!(store.len("right"), 1);
        assert!(store.is_empty("missing"));
        let missing: Vec<Row> = store.get_all_from("missing").unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn corrupt_document_fails_to_decode() {
        let store = MemoryStore::new();
        store.insert("rows", "bad", b"not json").unwrap();
        let err = store.get_all_from::<Row>("rows").unwrap_err();
        assert!(matches!(err, StoreError::Deserialize(_)));
    }
}
