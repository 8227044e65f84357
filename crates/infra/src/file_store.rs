//! JSON-file-backed record store.
//!
//! The whole record set lives in one JSON document. Every mutation writes a
//! complete new document to a sibling temp file and renames it over the old
//! one, so a crash mid-write leaves the previous version intact. The
//! in-memory copy is only swapped after the rename succeeds.
//!
//! The document also carries `last_id`, the highest id ever stored, so a
//! restarted process can keep ids unique even after a reset emptied the file.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stallbook_core::RecordId;
use stallbook_inventory::store::{insert_into, update_in};
use stallbook_inventory::{InventoryRecord, RecordStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    last_id: u64,
    records: Vec<InventoryRecord>,
}

impl Document {
    fn validate(&self) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::new();
        for record in &self.records {
            if !seen.insert(record.id()) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate record id {}",
                    record.id()
                )));
            }
            if record.id().get() > self.last_id {
                return Err(StoreError::Corrupt(format!(
                    "record id {} is above last_id {}",
                    record.id(),
                    self.last_id
                )));
            }
            record
                .check_invariants()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        }

        let closed = self.records.iter().filter(|r| r.sales_closed()).count();
        if closed != 0 && closed != self.records.len() {
            return Err(StoreError::Corrupt(
                "record set is only partially closed".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    doc: RwLock<Document>,
}

impl JsonFileRecordStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = match fs::read(&path) {
            Ok(bytes) => {
                let doc: Document = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                doc.validate()?;
                doc
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Document::default(),
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", path.display()))),
        };

        info!(
            path = %path.display(),
            records = doc.records.len(),
            last_id = doc.last_id,
            "record store opened"
        );
        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest id ever persisted; seed the id generator with this.
    pub fn last_id(&self) -> Result<u64, StoreError> {
        let doc = self.doc.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(doc.last_id)
    }

    fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let io_err = |e: std::io::Error| StoreError::Io(format!("{}: {e}", self.path.display()));
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), records = doc.records.len(), "record store persisted");
        Ok(())
    }

    /// Apply `change` to a copy of the document, persist it, then publish it.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut doc = self.doc.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut next = doc.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *doc = next;
        Ok(out)
    }
}

impl RecordStore for JsonFileRecordStore {
    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let doc = self.doc.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(doc.records.clone())
    }

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        let doc = self.doc.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(doc.records.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: InventoryRecord) -> Result<(), StoreError> {
        self.mutate(|doc| {
            doc.last_id = doc.last_id.max(record.id().get());
            insert_into(&mut doc.records, record)
        })
    }

    fn update(&self, record: InventoryRecord) -> Result<(), StoreError> {
        self.mutate(|doc| update_in(&mut doc.records, record))
    }

    fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        self.mutate(|doc| {
            let before = doc.records.len();
            doc.records.retain(|r| r.id() != id);
            Ok(doc.records.len() != before)
        })
    }

    fn replace_all(&self, records: Vec<InventoryRecord>) -> Result<(), StoreError> {
        self.mutate(|doc| {
            if let Some(max) = records.iter().map(|r| r.id().get()).max() {
                doc.last_id = doc.last_id.max(max);
            }
            doc.records = records;
            Ok(())
        })
    }

    fn clear(&self) -> Result<usize, StoreError> {
        self.mutate(|doc| {
            let discarded = doc.records.len();
            doc.records.clear();
            Ok(discarded)
        })
    }
}
