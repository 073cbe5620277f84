//! Crate error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while building, rendering or exporting a tree scene.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("unknown line style '{0}' (expected one of '-', '--', ':', '-.')")]
    InvalidLineStyle(String),
    #[error("invalid dash pattern: {0}")]
    InvalidDashPattern(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported output format for '{}'", .0.display())]
    UnsupportedFormat(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
