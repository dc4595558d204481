//! Configuration errors
//!
//! Capacity conditions (store full, cell full, record buffer full) are not
//! errors: they surface as counters on the diagnostics. Handle misuse is a
//! contract violation and panics. Only settings can fail recoverably.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("world size must be positive and finite (got {width} x {height})")]
    InvalidWorld { width: f32, height: f32 },
    #[error("collider radius must be positive and finite (got {0})")]
    InvalidRadius(f32),
    #[error("cell size {cell_size} must be finite and at least the collider diameter {diameter}")]
    CellTooSmall { cell_size: f32, diameter: f32 },
    #[error("{0} must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}
