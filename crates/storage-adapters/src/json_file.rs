//! # JsonFileStore
//!
//! One pretty-printed JSON array per collection: `<data_dir>/<namespace>_<collection>.json`.
//! Writes go to a sibling `.tmp` file that is synced and then renamed over the
//! target, so a crash mid-write leaves the previous collection intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use domains::{Collection, CollectionStore, DomainError, Result};
use tracing::debug;

pub struct JsonFileStore {
    root: PathBuf,
    namespace: String,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.root
            .join(format!("{}_{}.json", self.namespace, collection.name()))
    }
}

fn persistence(path: &Path, action: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::Persistence(format!("failed to {action} {}: {err}", path.display()))
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| persistence(path, "create", e))?;
    file.write_all(bytes)
        .map_err(|e| persistence(path, "write", e))?;
    file.sync_all().map_err(|e| persistence(path, "sync", e))
}

impl CollectionStore for JsonFileStore {
    fn load(&self, collection: Collection) -> Result<Vec<serde_json::Value>> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path).map_err(|e| persistence(&path, "read", e))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| persistence(&path, "parse", e))
    }

    fn save(&self, collection: Collection, records: &[serde_json::Value]) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| persistence(&self.root, "create", e))?;

        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(records)?;

        write_and_sync(&tmp, &bytes)?;
        fs::rename(&tmp, &path).map_err(|e| persistence(&path, "replace", e))?;
        debug!(%collection, records = records.len(), path = %path.display(), "collection saved");
        Ok(())
    }
}
