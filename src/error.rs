//! Error types for the fallible edges of the crate.
//!
//! The segmentation pipeline itself never fails; these cover config loading
//! and math rendering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// A math expression the renderer could not turn into output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render `{expression}`: {message}")]
    Math { expression: String, message: String },
}
