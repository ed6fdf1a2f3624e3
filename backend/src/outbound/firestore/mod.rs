//! Outbound adapters for the managed document store.

pub mod client;
pub mod config;
pub mod dto;
pub mod ledger;
pub mod report_store;
pub mod user_directory;

pub use client::{FieldIncrement, FirestoreClient, FirestoreError};
pub use config::FirestoreSettings;
pub use ledger::FirestoreLedger;
pub use report_store::FirestoreReportStore;
pub use user_directory::FirestoreUserDirectory;
