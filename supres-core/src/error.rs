//! Error types for the supres-core crate.

use thiserror::Error;

/// Top-level error type for the artifact pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PipelineError {
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
