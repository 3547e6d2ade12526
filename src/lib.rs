//! Sonoma CLI library
//!
//! This module exports the configuration store and CLI handlers for testing
//! and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;

pub use config::{ConfigPaths, ConfigStore};
pub use error::{ConfigError, ConfigResult};
