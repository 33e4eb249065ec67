//! Model definer — build the FSRCNN topology and export it directly.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::lite::LiteModel;
use crate::model::ModelSpec;
use crate::persistence;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of a define-and-export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReport {
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub sha256: String,
}

/// Builds the fixed architecture with untrained weights and writes the
/// lightweight artifact. One of the two producers of the artifact path;
/// the other is [`crate::convert::ModelConverter`].
pub struct ModelDefiner {
    config: PipelineConfig,
}

impl ModelDefiner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Define, compile, convert, and atomically write the artifact.
    pub fn define(&self) -> Result<CreateReport, PipelineError> {
        tracing::info!("Creating FSRCNN model");
        let saved = ModelSpec::fsrcnn_x2().initialize()?;

        tracing::info!("Converting to lightweight format");
        let bytes = LiteModel::from_saved(&saved)?.to_bytes()?;

        tracing::info!(path = %self.config.artifact_path.display(), "Saving artifact");
        persistence::atomic_write(&self.config.artifact_path, &bytes)?;

        Ok(CreateReport {
            output_path: self.config.artifact_path.clone(),
            output_size_bytes: bytes.len() as u64,
            sha256: persistence::sha256_hex(&bytes),
        })
    }
}
