//! Startup helpers shared by the binaries.
//!
//! Order: configuration, logging, metrics, client. Any error before the
//! client exists is fatal.

use std::path::Path;

use crate::config::{load_config, ClientConfig, ConfigError};

/// Load the config file if given, otherwise use defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ClientConfig::default()),
    }
}
