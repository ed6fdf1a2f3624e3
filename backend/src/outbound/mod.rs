//! Outbound adapters (driven side of the hexagon).

pub mod exchange;
pub mod firebase_auth;
pub mod firestore;
pub mod storage;

pub use exchange::{ExchangeSettings, LunoHttpGateway};
pub use firebase_auth::{FirebaseAuthProvider, IdentitySettings};
pub use firestore::{
    FirestoreClient, FirestoreLedger, FirestoreReportStore, FirestoreSettings,
    FirestoreUserDirectory,
};
pub use storage::FirebaseStorageStore;
