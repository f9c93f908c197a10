use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Error types for the leaf saliency pipeline
#[derive(Error, Debug)]
pub enum HeatmapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Corrupt or unsupported image data. The only hard failure of the core.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Field buffer has {actual} values, expected {expected}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, HeatmapError>;
