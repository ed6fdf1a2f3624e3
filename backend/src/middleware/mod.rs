//! Middleware for the application.
//!
//! `trace` provides the tracing middleware attaching a request-scoped trace
//! identifier.

pub mod trace;

pub use trace::Trace;
