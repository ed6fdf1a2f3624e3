//! Backend entry-point: loads configuration, wires adapters, starts the
//! HTTP server.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use amanah_backend::inbound::http::health::HealthState;
use amanah_backend::inbound::http::session_config::{
    key_fingerprint, BuildMode, RuntimeMode, SessionSettings,
};
use amanah_backend::outbound::{ExchangeSettings, FirestoreSettings, IdentitySettings};
use server::{build_ports, AdapterSettings, ServerConfig};

const BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

fn load_settings<T: OrthoConfig>(what: &str) -> std::io::Result<T> {
    T::load().map_err(|err| std::io::Error::other(format!("failed to load {what}: {err}")))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::new();
    let mode = RuntimeMode::from_env(&env);
    let session = SessionSettings::load(&env, BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(
        ?mode,
        key_fingerprint = %key_fingerprint(&session.key),
        "configuration loaded"
    );

    let adapters = AdapterSettings {
        firestore: load_settings::<FirestoreSettings>("document store settings")?,
        identity: load_settings::<IdentitySettings>("identity settings")?,
        exchange: load_settings::<ExchangeSettings>("exchange settings")?,
    };
    let ports = build_ports(mode, &adapters)?;

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        BIND_ADDR.into(),
    )
    .with_ports(ports);

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    server.await
}
