//! # storage-adapters
//!
//! Implementations of the `CollectionStore` port plus the first-run seed set.

pub mod memory;
#[cfg(feature = "json-file")]
pub mod json_file;
pub mod seed;

use std::sync::Arc;

use configs::{StoreBackend, StoreSettings};
#[cfg(not(feature = "json-file"))]
use domains::DomainError;
use domains::{CollectionStore, Result};
use tracing::info;

#[cfg(feature = "json-file")]
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use seed::{reseed, seed_if_empty, SeedReport};

/// Builds the backend named in `store.backend`.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn CollectionStore>> {
    let store: Arc<dyn CollectionStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new(settings.namespace.clone())),
        #[cfg(feature = "json-file")]
        StoreBackend::JsonFile => Arc::new(JsonFileStore::new(
            settings.data_dir.clone(),
            settings.namespace.clone(),
        )),
        #[cfg(not(feature = "json-file"))]
        StoreBackend::JsonFile => {
            return Err(DomainError::State(
                "json-file backend not compiled in; enable the `json-file` feature".into(),
            ))
        }
    };
    info!(backend = ?settings.backend, namespace = %settings.namespace, "collection store opened");
    Ok(store)
}
