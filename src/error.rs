//! Error types for rangehist operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, binning or rendering a histogram.
#[derive(Error, Debug)]
pub enum Error {
    /// The dataset is unusable (empty after dropping missing values, unknown column).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The bin specification cannot be turned into bin edges.
    #[error("Invalid bin specification: {0}")]
    InvalidBinSpec(String),

    /// Invalid dimensions for framebuffer or chart.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Configuration could not be parsed.
    #[error("Config parse error at line {line}: {message}")]
    ConfigParse {
        /// Line of the offending entry (0 if unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// Invalid colour literal.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),
}
