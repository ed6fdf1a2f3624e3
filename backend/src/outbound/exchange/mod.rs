//! Outbound adapters for the third-party exchange.

pub mod config;
pub mod dto;
pub mod http_gateway;

pub use config::ExchangeSettings;
pub use http_gateway::LunoHttpGateway;
