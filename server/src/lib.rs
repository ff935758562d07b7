//! Only4kiddos booking backend server.
//!
//! Configuration, metrics exporter and startup wiring for the
//! `only4kiddos-server` binary.

pub mod app;
pub mod config;
pub mod metrics;

pub use config::{Config, ConfigError};
