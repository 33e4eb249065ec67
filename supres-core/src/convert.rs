//! Format converter — full saved model to lightweight artifact.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::lite::LiteModel;
use crate::model::SavedModel;
use crate::persistence;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a model conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub source_size_bytes: u64,
    pub output_size_bytes: u64,
    pub compression_ratio: f64,
    pub sha256: String,
}

/// Converts an existing trained model on disk. The source model is
/// read-only; only the artifact path is written, and only after the
/// whole conversion has succeeded.
pub struct ModelConverter {
    config: PipelineConfig,
}

impl ModelConverter {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Load, convert, and atomically write the artifact.
    pub fn convert(&self) -> Result<ConversionReport, PipelineError> {
        let source = &self.config.full_model_path;
        tracing::info!(path = %source.display(), "Loading saved model");
        let saved = SavedModel::load(source)?;
        let source_size_bytes = std::fs::metadata(source)?.len();

        tracing::info!("Converting to lightweight format");
        let bytes = LiteModel::from_saved(&saved)?.to_bytes()?;

        tracing::info!(path = %self.config.artifact_path.display(), "Saving artifact");
        persistence::atomic_write(&self.config.artifact_path, &bytes)?;

        let output_size_bytes = bytes.len() as u64;
        Ok(ConversionReport {
            source_path: source.clone(),
            output_path: self.config.artifact_path.clone(),
            source_size_bytes,
            output_size_bytes,
            compression_ratio: source_size_bytes as f64 / output_size_bytes.max(1) as f64,
            sha256: persistence::sha256_hex(&bytes),
        })
    }
}
