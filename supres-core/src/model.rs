//! FSRCNN network topology and the full saved-model format.
//!
//! The topology is a fixed three-layer convolutional stack: feature
//! extraction, non-linear mapping, and a stride-2 transpose convolution
//! that doubles the spatial resolution. Input accepts any height/width
//! with a fixed channel count of 3.

use crate::error::PipelineError;
use crate::persistence;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version tag of the full saved-model JSON format.
pub const SAVED_FORMAT_VERSION: u32 = 1;

/// Number of color channels the network consumes and produces.
pub const IMAGE_CHANNELS: usize = 3;

/// Layer activation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Linear,
}

/// A single layer of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Stride-1 convolution with same padding.
    Conv2d {
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        activation: Activation,
    },
    /// Transpose convolution with same padding; multiplies spatial dims
    /// by `stride`.
    Conv2dTranspose {
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        activation: Activation,
    },
}

impl LayerSpec {
    pub fn in_channels(&self) -> usize {
        match self {
            Self::Conv2d { in_channels, .. } | Self::Conv2dTranspose { in_channels, .. } => {
                *in_channels
            }
        }
    }

    pub fn out_channels(&self) -> usize {
        match self {
            Self::Conv2d { out_channels, .. } | Self::Conv2dTranspose { out_channels, .. } => {
                *out_channels
            }
        }
    }

    pub fn kernel_size(&self) -> usize {
        match self {
            Self::Conv2d { kernel_size, .. } | Self::Conv2dTranspose { kernel_size, .. } => {
                *kernel_size
            }
        }
    }

    /// Propagate an input shape `(height, width, channels)` through this
    /// layer. Channel mismatch is an error; any spatial size is accepted.
    pub fn output_shape(
        &self,
        input: (usize, usize, usize),
    ) -> Result<(usize, usize, usize), PipelineError> {
        let (h, w, c) = input;
        if c != self.in_channels() {
            return Err(PipelineError::model(format!(
                "layer expects {} input channels, got {c}",
                self.in_channels()
            )));
        }
        match self {
            Self::Conv2d { out_channels, .. } => Ok((h, w, *out_channels)),
            Self::Conv2dTranspose {
                out_channels,
                stride,
                ..
            } => Ok((h * stride, w * stride, *out_channels)),
        }
    }

    /// Number of kernel elements for this layer.
    pub fn kernel_len(&self) -> usize {
        self.kernel_size() * self.kernel_size() * self.in_channels() * self.out_channels()
    }
}

/// Optimizer/loss pairing attached when a model is compiled. Irrelevant
/// to inference; present because the export step requires a compiled
/// model, and stripped during conversion to the lightweight format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileSpec {
    pub optimizer: String,
    pub loss: String,
}

impl Default for CompileSpec {
    fn default() -> Self {
        Self {
            optimizer: "adam".to_string(),
            loss: "mse".to_string(),
        }
    }
}

/// Ordered layer stack making up a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub layers: Vec<LayerSpec>,
}

impl ModelSpec {
    /// The fixed FSRCNN x2 architecture: feature extraction, non-linear
    /// mapping, and a stride-2 deconvolution back to 3 channels.
    pub fn fsrcnn_x2() -> Self {
        Self {
            name: "fsrcnn_x2".to_string(),
            layers: vec![
                LayerSpec::Conv2d {
                    in_channels: IMAGE_CHANNELS,
                    out_channels: 32,
                    kernel_size: 3,
                    activation: Activation::Relu,
                },
                LayerSpec::Conv2d {
                    in_channels: 32,
                    out_channels: 32,
                    kernel_size: 3,
                    activation: Activation::Relu,
                },
                LayerSpec::Conv2dTranspose {
                    in_channels: 32,
                    out_channels: IMAGE_CHANNELS,
                    kernel_size: 3,
                    stride: 2,
                    activation: Activation::Linear,
                },
            ],
        }
    }

    /// Propagate an input shape through the whole stack.
    pub fn output_shape(
        &self,
        input: (usize, usize, usize),
    ) -> Result<(usize, usize, usize), PipelineError> {
        let mut shape = input;
        for layer in &self.layers {
            shape = layer.output_shape(shape)?;
        }
        Ok(shape)
    }

    /// Check that consecutive layers agree on channel counts.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.layers.is_empty() {
            return Err(PipelineError::model("model has no layers"));
        }
        for pair in self.layers.windows(2) {
            if pair[0].out_channels() != pair[1].in_channels() {
                return Err(PipelineError::model(format!(
                    "channel mismatch between layers: {} -> {}",
                    pair[0].out_channels(),
                    pair[1].in_channels()
                )));
            }
        }
        Ok(())
    }

    /// Produce a compiled full model with untrained (glorot-uniform)
    /// kernels and zero biases.
    pub fn initialize(&self) -> Result<SavedModel, PipelineError> {
        self.validate()?;
        let weights = self.layers.iter().map(glorot_init).collect();
        Ok(SavedModel {
            format_version: SAVED_FORMAT_VERSION,
            spec: self.clone(),
            compile: CompileSpec::default(),
            weights,
        })
    }
}

/// Kernel and bias tensors for one layer, kernel stored row-major as
/// `[kernel_h, kernel_w, in_channels, out_channels]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub kernel_shape: [usize; 4],
    pub kernel: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Full on-disk model: architecture, compile settings, and weights.
/// This is the framework-native save format the converter reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedModel {
    pub format_version: u32,
    pub spec: ModelSpec,
    pub compile: CompileSpec,
    pub weights: Vec<LayerWeights>,
}

impl SavedModel {
    /// Load a saved model from disk, rejecting unknown format versions
    /// and weight tensors that disagree with the declared architecture.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let model: Self = persistence::load_json(path)?
            .ok_or_else(|| PipelineError::not_found(format!("saved model {}", path.display())))?;
        if model.format_version != SAVED_FORMAT_VERSION {
            return Err(PipelineError::invalid_input(format!(
                "unsupported saved-model format version {}",
                model.format_version
            )));
        }
        model.check_weights()?;
        Ok(model)
    }

    /// Atomically write the model as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        persistence::atomic_write_json(path, self)?;
        Ok(())
    }

    /// Verify every weight tensor against the architecture.
    pub fn check_weights(&self) -> Result<(), PipelineError> {
        self.spec.validate()?;
        if self.weights.len() != self.spec.layers.len() {
            return Err(PipelineError::invalid_input(format!(
                "expected {} weight tensors, found {}",
                self.spec.layers.len(),
                self.weights.len()
            )));
        }
        for (layer, weights) in self.spec.layers.iter().zip(&self.weights) {
            let expected = [
                layer.kernel_size(),
                layer.kernel_size(),
                layer.in_channels(),
                layer.out_channels(),
            ];
            if weights.kernel_shape != expected {
                return Err(PipelineError::invalid_input(format!(
                    "kernel shape {:?} does not match layer shape {expected:?}",
                    weights.kernel_shape
                )));
            }
            if weights.kernel.len() != layer.kernel_len() {
                return Err(PipelineError::invalid_input(format!(
                    "kernel has {} elements, expected {}",
                    weights.kernel.len(),
                    layer.kernel_len()
                )));
            }
            if weights.bias.len() != layer.out_channels() {
                return Err(PipelineError::invalid_input(format!(
                    "bias has {} elements, expected {}",
                    weights.bias.len(),
                    layer.out_channels()
                )));
            }
        }
        Ok(())
    }
}

/// Glorot-uniform kernel with zero bias for one layer.
fn glorot_init(layer: &LayerSpec) -> LayerWeights {
    use rand::Rng;

    let k = layer.kernel_size();
    let fan_in = (k * k * layer.in_channels()) as f32;
    let fan_out = (k * k * layer.out_channels()) as f32;
    let limit = (6.0 / (fan_in + fan_out)).sqrt();

    let mut rng = rand::thread_rng();
    let kernel = (0..layer.kernel_len())
        .map(|_| rng.gen_range(-limit..limit))
        .collect();

    LayerWeights {
        kernel_shape: [k, k, layer.in_channels(), layer.out_channels()],
        kernel,
        bias: vec![0.0; layer.out_channels()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_fsrcnn_doubles_spatial_dims_and_keeps_channels() {
        let spec = ModelSpec::fsrcnn_x2();
        for (h, w) in [(1, 1), (32, 32), (33, 47), (480, 270)] {
            let out = spec.output_shape((h, w, IMAGE_CHANNELS)).unwrap();
            assert_eq!(out, (h * 2, w * 2, IMAGE_CHANNELS));
        }
    }

    #[test]
    fn test_fsrcnn_rejects_wrong_channel_count() {
        let spec = ModelSpec::fsrcnn_x2();
        let err = spec.output_shape((64, 64, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
    }

    #[test]
    fn test_fsrcnn_layer_structure() {
        let spec = ModelSpec::fsrcnn_x2();
        assert_eq!(spec.layers.len(), 3);
        assert_eq!(spec.layers[0].in_channels(), 3);
        assert_eq!(spec.layers[2].out_channels(), 3);
        assert!(matches!(
            spec.layers[2],
            LayerSpec::Conv2dTranspose { stride: 2, .. }
        ));
        spec.validate().unwrap();
    }

    #[test]
    fn test_initialize_produces_matching_weights() {
        let model = ModelSpec::fsrcnn_x2().initialize().unwrap();
        model.check_weights().unwrap();
        assert_eq!(model.compile, CompileSpec::default());
        // First layer: 3x3 kernel, 3 in, 32 out.
        assert_eq!(model.weights[0].kernel.len(), 3 * 3 * 3 * 32);
        assert_eq!(model.weights[0].bias, vec![0.0; 32]);
    }

    #[test]
    fn test_glorot_kernel_within_limit() {
        let model = ModelSpec::fsrcnn_x2().initialize().unwrap();
        let layer = &model.spec.layers[0];
        let k = layer.kernel_size() as f32;
        let limit =
            (6.0 / (k * k * layer.in_channels() as f32 + k * k * layer.out_channels() as f32))
                .sqrt();
        assert!(model.weights[0].kernel.iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fsrcnn_x2.pb");
        let model = ModelSpec::fsrcnn_x2().initialize().unwrap();

        model.save(&path).unwrap();
        let loaded = SavedModel::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = SavedModel::load(&dir.path().join("absent.pb")).unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_unknown_format_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.pb");
        let mut model = ModelSpec::fsrcnn_x2().initialize().unwrap();
        model.format_version = 99;
        model.save(&path).unwrap();

        let err = SavedModel::load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_check_weights_rejects_truncated_kernel() {
        let mut model = ModelSpec::fsrcnn_x2().initialize().unwrap();
        model.weights[1].kernel.pop();
        let err = model.check_weights().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_catches_channel_mismatch() {
        let spec = ModelSpec {
            name: "broken".to_string(),
            layers: vec![
                LayerSpec::Conv2d {
                    in_channels: 3,
                    out_channels: 16,
                    kernel_size: 3,
                    activation: Activation::Relu,
                },
                LayerSpec::Conv2d {
                    in_channels: 32,
                    out_channels: 3,
                    kernel_size: 3,
                    activation: Activation::Linear,
                },
            ],
        };
        assert!(spec.validate().is_err());
    }
}
