//! Storage module for configuration.

pub mod config;

pub use config::{AppConfig, BackendKind, ConfigError, CuratorSettings, DiscoverySettings};
