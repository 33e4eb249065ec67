//! Configuration for the artifact pipeline.
//!
//! Every path, URL, and transfer knob the three entry points use lives here
//! so that tests can point the pipeline at temporary directories and mock
//! endpoints. The defaults reproduce the conventional locations the mobile
//! app build expects.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline configuration shared by all three entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path of the full saved model consumed by the format converter.
    #[serde(default = "default_full_model_path")]
    pub full_model_path: PathBuf,
    /// Path of the lightweight artifact produced by every entry point.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,
    /// URL of the pre-trained lightweight artifact.
    #[serde(default = "default_model_url")]
    pub model_url: String,
    /// Buffered-write chunk size for streaming downloads, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Request timeout for the download client (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy for the download entry point.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            full_model_path: default_full_model_path(),
            artifact_path: default_artifact_path(),
            model_url: default_model_url(),
            chunk_size: default_chunk_size(),
            timeout_secs: default_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Bounded retry with exponential backoff for transient download failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. 1 disables retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff between attempts (milliseconds), doubled each retry.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_full_model_path() -> PathBuf {
    PathBuf::from("app/src/main/assets/fsrcnn_x2.pb")
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("app/src/main/assets/fsrcnn_x2.tflite")
}

fn default_model_url() -> String {
    "https://github.com/Saafke/FSRCNN_Tensorflow/raw/master/models/FSRCNN_x2.tflite".to_string()
}

fn default_chunk_size() -> usize {
    8192
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_conventional_paths() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.full_model_path,
            PathBuf::from("app/src/main/assets/fsrcnn_x2.pb")
        );
        assert_eq!(
            config.artifact_path,
            PathBuf::from("app/src/main/assets/fsrcnn_x2.tflite")
        );
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"artifact_path": "/tmp/out.tflite"}"#).unwrap();
        assert_eq!(config.artifact_path, PathBuf::from("/tmp/out.tflite"));
        assert_eq!(config.chunk_size, 8192);
        assert!(config.model_url.starts_with("https://"));
    }
}
