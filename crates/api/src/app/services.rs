use std::sync::Arc;

use axum::http::StatusCode;

use stallbook_core::{Clock, SequentialIdGenerator, SystemClock};
use stallbook_infra::JsonFileRecordStore;
use stallbook_inventory::{InMemoryRecordStore, InventoryLedger, LedgerResult, RecordStore, StoreError};

use crate::app::errors;
use crate::config::ApiConfig;

// Type-erased so the in-memory and file-backed wirings share one handler set.
pub type SharedStore = Arc<dyn RecordStore>;
pub type SharedClock = Arc<dyn Clock>;
pub type StallLedger = InventoryLedger<SharedStore, SequentialIdGenerator, SharedClock>;

#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<StallLedger>,
    pub allow_set_sold: bool,
}

impl AppServices {
    pub fn new(store: SharedStore, ids: SequentialIdGenerator, clock: SharedClock, allow_set_sold: bool) -> Self {
        Self {
            ledger: Arc::new(InventoryLedger::new(store, ids, clock)),
            allow_set_sold,
        }
    }

    /// Volatile ledger; everything is lost when the process exits.
    pub fn in_memory(clock: SharedClock, allow_set_sold: bool) -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            SequentialIdGenerator::new(),
            clock,
            allow_set_sold,
        )
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, StoreError> {
        let clock: SharedClock = Arc::new(SystemClock);
        match &config.data_file {
            None => {
                tracing::warn!("no data file configured; records are kept in memory only");
                Ok(Self::in_memory(clock, config.allow_set_sold))
            }
            Some(path) => {
                let store = JsonFileRecordStore::open(path)?;
                let ids = SequentialIdGenerator::starting_after(store.last_id()?);
                Ok(Self::new(Arc::new(store), ids, clock, config.allow_set_sold))
            }
        }
    }

    /// Run a ledger call on the blocking pool and map its error to a response.
    ///
    /// Ledger calls take a std lock and, with a file-backed store, write and
    /// fsync the data file; neither may happen on an async worker thread.
    pub async fn with_ledger<T, F>(&self, f: F) -> Result<T, axum::response::Response>
    where
        F: FnOnce(&StallLedger) -> LedgerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        match tokio::task::spawn_blocking(move || f(&ledger)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(errors::ledger_error_to_response(e)),
            Err(e) => {
                tracing::error!(error = %e, "ledger task failed");
                Err(errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "ledger task failed",
                ))
            }
        }
    }
}
