//! # MemoryStore
//!
//! Process-local `CollectionStore`. Collections are kept as serialized JSON text,
//! the same shape a browser-style key-value store would hold, so every load goes
//! through a real parse.

use dashmap::DashMap;
use domains::{Collection, CollectionStore, DomainError, Result};

pub struct MemoryStore {
    namespace: String,
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: DashMap::new(),
        }
    }

    fn key(&self, collection: Collection) -> String {
        format!("{}_{}", self.namespace, collection.name())
    }

    /// Raw stored text, if any.
    pub fn raw(&self, collection: Collection) -> Option<String> {
        self.entries
            .get(&self.key(collection))
            .map(|entry| entry.value().clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("bloodbank")
    }
}

impl CollectionStore for MemoryStore {
    fn load(&self, collection: Collection) -> Result<Vec<serde_json::Value>> {
        match self.entries.get(&self.key(collection)) {
            Some(text) => serde_json::from_str(text.value()).map_err(|e| {
                DomainError::Persistence(format!("collection '{collection}' is unreadable: {e}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> Result<()> {
        let text = serde_json::to_string(records)?;
        self.entries.insert(self.key(collection), text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_collection_loads_empty() {
        let store = MemoryStore::default();
        assert!(store.load(Collection::Matches).unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_collection() {
        let store = MemoryStore::new("test");
        store
            .save(Collection::Donors, &[json!({ "id": 1 }), json!({ "id": 2 })])
            .unwrap();
        store.save(Collection::Donors, &[json!({ "id": 3 })]).unwrap();

        assert_eq!(store.load(Collection::Donors).unwrap(), vec![json!({ "id": 3 })]);
        assert!(store.load(Collection::Units).unwrap().is_empty());
        assert!(store.raw(Collection::Donors).is_some());
    }

    #[test]
    fn stores_compact_json_text() {
        let store = MemoryStore::new("a");
        store
            .save(Collection::Units, &[json!({ "unitCode": "BLD-IND-0001" })])
            .unwrap();
        assert_eq!(
            store.raw(Collection::Units).as_deref(),
            Some(r#"[{"unitCode":"BLD-IND-0001"}]"#)
        );
    }
}
