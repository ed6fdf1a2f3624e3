//! Backend for the Amanah donation and zakat payment tracker.
//!
//! Hexagonal layout: `domain` holds types, ports, and services; `inbound`
//! exposes the HTTP surface; `outbound` implements the ports against the
//! identity provider, document store, object store, and exchange.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Tracing middleware attaching a request-scoped trace identifier.
pub use middleware::Trace;
