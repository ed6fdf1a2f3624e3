//! Outbound port wiring based on runtime configuration.
//!
//! Production with full configuration gets the live adapters; anything less
//! gets in-memory fixtures, and the exchange rail is mocked outside
//! production regardless of configuration. Every substitution is logged so
//! a misconfigured deployment is visible at startup.

use std::sync::Arc;

use tracing::{info, warn};

use amanah_backend::domain::ports::{
    FixtureAttachmentStore, FixtureExchangeGateway, FixtureIdentityProvider, FixtureLedger,
    FixtureReportStore, FixtureUserDirectory,
};
use amanah_backend::inbound::http::session_config::{secret_fingerprint, RuntimeMode};
use amanah_backend::inbound::http::state::HttpStatePorts;
use amanah_backend::outbound::{
    ExchangeSettings, FirebaseAuthProvider, FirebaseStorageStore, FirestoreClient,
    FirestoreLedger, FirestoreReportStore, FirestoreSettings, FirestoreUserDirectory,
    IdentitySettings, LunoHttpGateway,
};

/// Bundle of the adapter settings the wiring consumes.
pub struct AdapterSettings {
    /// Document store connection settings.
    pub firestore: FirestoreSettings,
    /// Identity provider settings.
    pub identity: IdentitySettings,
    /// Exchange gateway settings.
    pub exchange: ExchangeSettings,
}

/// Wire outbound ports for the given runtime mode.
///
/// # Errors
/// Fails when a configured live adapter cannot be constructed (bad URL,
/// client build failure). Missing configuration is not an error; it selects
/// the fixture instead.
pub fn build_ports(
    mode: RuntimeMode,
    settings: &AdapterSettings,
) -> std::io::Result<HttpStatePorts> {
    let mut ports = HttpStatePorts::default();

    match &settings.firestore.project_id {
        Some(project_id) => {
            let client = Arc::new(
                FirestoreClient::new(&settings.firestore, project_id.clone())
                    .map_err(|err| std::io::Error::other(err.to_string()))?,
            );
            ports.directory = Arc::new(FirestoreUserDirectory::new(Arc::clone(&client)));
            ports.donations = Arc::new(FirestoreLedger::donations(Arc::clone(&client)));
            ports.zakat = Arc::new(FirestoreLedger::zakat(Arc::clone(&client)));
            ports.reports = Arc::new(FirestoreReportStore::new(Arc::clone(&client)));
            info!(%project_id, "document store adapters wired");

            match &settings.firestore.storage_bucket {
                Some(bucket) => {
                    ports.attachments = Arc::new(
                        FirebaseStorageStore::new(bucket.clone())
                            .map_err(|err| std::io::Error::other(err.to_string()))?,
                    );
                }
                None => {
                    warn!("no storage bucket configured; attachment uploads use the fixture");
                    ports.attachments = Arc::new(FixtureAttachmentStore::default());
                }
            }
        }
        None => {
            warn!("no document store project configured; using in-memory fixtures");
            ports.directory = Arc::new(FixtureUserDirectory::default());
            ports.donations = Arc::new(FixtureLedger::default());
            ports.zakat = Arc::new(FixtureLedger::default());
            ports.reports = Arc::new(FixtureReportStore::default());
            ports.attachments = Arc::new(FixtureAttachmentStore::default());
        }
    }

    match &settings.identity.api_key {
        Some(api_key) => {
            ports.identity = Arc::new(
                FirebaseAuthProvider::with_base_url(
                    api_key.clone(),
                    settings.identity.auth_base_url(),
                )
                .map_err(|err| std::io::Error::other(err.to_string()))?,
            );
            info!("identity provider wired");
        }
        None => {
            warn!("no identity provider key configured; using the fixture provider");
            ports.identity = Arc::new(FixtureIdentityProvider);
        }
    }

    // The dev/prod split is contractual: only a production deployment with a
    // configured key pair ever reaches the real exchange.
    match (mode.is_production(), settings.exchange.key_pair()) {
        (true, Some((key_id, key_secret))) => {
            ports.exchange = Arc::new(
                LunoHttpGateway::new(
                    settings.exchange.base_url(),
                    key_id.to_owned(),
                    key_secret.to_owned(),
                )
                .map_err(|err| std::io::Error::other(err.to_string()))?,
            );
            info!(
                key_id,
                secret_fingerprint = %secret_fingerprint(key_secret.as_bytes()),
                "live exchange gateway wired"
            );
        }
        (is_production, _) => {
            if is_production {
                warn!("no exchange key pair configured; using the deterministic mock gateway");
            } else {
                info!("non-production runtime; using the deterministic mock exchange gateway");
            }
            ports.exchange = Arc::new(FixtureExchangeGateway::default());
        }
    }

    Ok(ports)
}
