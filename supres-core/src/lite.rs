//! Lightweight inference format.
//!
//! The deployable artifact the mobile app ships: architecture plus
//! float32 weights, with all training state (optimizer, loss) stripped.
//! Encoded with `bincode` behind a magic/version header, so encoding the
//! same source model twice is byte-for-byte identical.

use crate::error::PipelineError;
use crate::model::{LayerWeights, ModelSpec, SavedModel};
use serde::{Deserialize, Serialize};

/// Magic bytes at the head of every lightweight artifact.
pub const LITE_MAGIC: [u8; 4] = *b"SRLT";

/// Version tag of the lightweight encoding.
pub const LITE_FORMAT_VERSION: u32 = 1;

/// Inference-ready model: what remains of a [`SavedModel`] after the
/// default float32-only conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteModel {
    magic: [u8; 4],
    format_version: u32,
    pub spec: ModelSpec,
    pub weights: Vec<LayerWeights>,
}

impl LiteModel {
    /// Convert a compiled full model, stripping its training state.
    pub fn from_saved(saved: &SavedModel) -> Result<Self, PipelineError> {
        saved.check_weights()?;
        Ok(Self {
            magic: LITE_MAGIC,
            format_version: LITE_FORMAT_VERSION,
            spec: saved.spec.clone(),
            weights: saved.weights.clone(),
        })
    }

    /// Serialize to the deployable binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode an artifact, rejecting foreign or future encodings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        let model: Self = bincode::deserialize(bytes)?;
        if model.magic != LITE_MAGIC {
            return Err(PipelineError::invalid_input(
                "not a lightweight model artifact (bad magic)",
            ));
        }
        if model.format_version != LITE_FORMAT_VERSION {
            return Err(PipelineError::invalid_input(format!(
                "unsupported artifact format version {}",
                model.format_version
            )));
        }
        model.spec.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conversion_strips_training_state_keeps_weights() {
        let saved = ModelSpec::fsrcnn_x2().initialize().unwrap();
        let lite = LiteModel::from_saved(&saved).unwrap();
        assert_eq!(lite.spec, saved.spec);
        assert_eq!(lite.weights, saved.weights);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let saved = ModelSpec::fsrcnn_x2().initialize().unwrap();
        let lite = LiteModel::from_saved(&saved).unwrap();
        let bytes = lite.to_bytes().unwrap();
        let decoded = LiteModel::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, lite);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let saved = ModelSpec::fsrcnn_x2().initialize().unwrap();
        let a = LiteModel::from_saved(&saved).unwrap().to_bytes().unwrap();
        let b = LiteModel::from_saved(&saved).unwrap().to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_corrupt_bytes() {
        assert!(LiteModel::from_bytes(b"not a model").is_err());
    }

    #[test]
    fn test_rejects_saved_model_with_broken_weights() {
        let mut saved = ModelSpec::fsrcnn_x2().initialize().unwrap();
        saved.weights[0].bias.push(1.0);
        assert!(LiteModel::from_saved(&saved).is_err());
    }
}
