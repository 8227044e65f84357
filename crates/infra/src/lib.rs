//! Infrastructure layer: persistence adapters for the inventory ledger.

pub mod file_store;

pub use file_store::JsonFileRecordStore;
