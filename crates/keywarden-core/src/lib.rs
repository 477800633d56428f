//! # keywarden-core
//!
//! Core types, configuration, and utilities for Keywarden.
//!
//! This crate provides shared functionality used across all Keywarden crates:
//!
//! - **Configuration**: Loading, validation, and management of config files
//! - **Records**: The key record stored for each encrypted volume
//! - **Utilities**: Path resolution, environment handling, and secret wrappers

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod record;
pub mod secret;

// Re-exports for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use record::{KeyRecord, SecretRecord};
pub use secret::SecretString;
