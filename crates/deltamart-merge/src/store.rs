//! In-memory keyed table for one entity type.
//!
//! Backed by a `BTreeMap` rather than a hash map: iteration order is then
//! a pure function of the stored keys, so two runs over the same inputs
//! serialize to byte-identical output (the idempotence property downstream
//! tests rely on).

use deltamart_model::KeyedRow;
use std::collections::BTreeMap;

/// Current-state table for one entity type, keyed by primary key.
///
/// Lives only for the duration of one merge run.
#[derive(Debug, Clone, Default)]
pub struct EntityStore<R: KeyedRow> {
    rows: BTreeMap<String, R>,
}

impl<R: KeyedRow> EntityStore<R> {
    pub fn new() -> Self {
        EntityStore {
            rows: BTreeMap::new(),
        }
    }

    /// Insert or replace the row at its own key. Last write wins; this
    /// never fails.
    pub fn put(&mut self, row: R) {
        self.rows.insert(row.key().to_string(), row);
    }

    /// Remove the row at `key` if present. Deleting an absent key is a
    /// no-op; delta batches may settle keys that earlier batches already
    /// removed.
    pub fn delete(&mut self, key: &str) {
        self.rows.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &R)> {
        self.rows.iter()
    }

    /// Consume the store into its final mapping.
    pub fn snapshot(self) -> BTreeMap<String, R> {
        self.rows
    }
}

impl<R: KeyedRow> FromIterator<R> for EntityStore<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        let mut store = EntityStore::new();
        for row in iter {
            store.put(row);
        }
        store
    }
}
