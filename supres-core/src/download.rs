//! Artifact downloader — fetch the pre-trained lightweight model over HTTP.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Result of a completed download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadReport {
    pub url: String,
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
    pub attempts: u32,
}

/// Streams a remote artifact to the artifact path.
///
/// The body is written chunk-by-chunk to a `.tmp` sibling and renamed
/// into place once the transfer completes, so an interrupted download
/// never leaves a partial file at the final path. Transient failures
/// (transport errors, 5xx) are retried per [`crate::config::RetryPolicy`];
/// client errors fail immediately.
pub struct ArtifactDownloader {
    config: PipelineConfig,
    client: reqwest::Client,
}

impl ArtifactDownloader {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Download the artifact, creating the destination tree if missing.
    pub async fn download(&self) -> Result<DownloadReport, PipelineError> {
        if let Some(parent) = self.config.artifact_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let max_attempts = self.config.retry.max_attempts.max(1);
        let mut attempt: u32 = 1;
        loop {
            match self.fetch_once().await {
                Ok((size_bytes, sha256)) => {
                    return Ok(DownloadReport {
                        url: self.config.model_url.clone(),
                        output_path: self.config.artifact_path.clone(),
                        size_bytes,
                        sha256,
                        attempts: attempt,
                    });
                }
                Err(err) if attempt < max_attempts && is_transient(&err) => {
                    let backoff_ms = self.config.retry.backoff_ms << (attempt - 1);
                    tracing::warn!(attempt, backoff_ms, error = %err, "Download failed, retrying");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
                Err(PipelineError::Http(err)) => {
                    return Err(PipelineError::download(format!(
                        "{err}; check your internet connection and try again"
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn fetch_once(&self) -> Result<(u64, String), PipelineError> {
        tracing::info!(url = %self.config.model_url, "Downloading model artifact");
        let response = self
            .client
            .get(&self.config.model_url)
            .send()
            .await?
            .error_for_status()?;

        let tmp = self.config.artifact_path.with_extension("tmp");
        let result = self.stream_body(response, &tmp).await;
        match result {
            Ok(ok) => {
                tokio::fs::rename(&tmp, &self.config.artifact_path).await?;
                Ok(ok)
            }
            Err(err) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                Err(err)
            }
        }
    }

    async fn stream_body(
        &self,
        response: reqwest::Response,
        tmp: &Path,
    ) -> Result<(u64, String), PipelineError> {
        let file = tokio::fs::File::create(tmp).await?;
        let mut writer = tokio::io::BufWriter::with_capacity(self.config.chunk_size, file);
        let mut hasher = Sha256::new();
        let mut size_bytes: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            size_bytes += chunk.len() as u64;
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        Ok((size_bytes, format!("{:x}", hasher.finalize())))
    }
}

/// Transport errors and server errors are worth retrying; client errors
/// (4xx) and local filesystem errors are not.
fn is_transient(err: &PipelineError) -> bool {
    match err {
        PipelineError::Http(err) => match err.status() {
            Some(status) => status.is_server_error(),
            None => err.is_timeout() || err.is_connect() || err.is_request(),
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::persistence;

    #[test]
    fn test_local_errors_are_not_transient() {
        let err = PipelineError::Io(std::io::Error::other("disk full"));
        assert!(!is_transient(&err));
        assert!(!is_transient(&PipelineError::download("gave up")));
    }

    #[test]
    fn test_retry_policy_floor_is_one_attempt() {
        let config = PipelineConfig {
            retry: RetryPolicy {
                max_attempts: 0,
                backoff_ms: 1,
            },
            ..PipelineConfig::default()
        };
        assert_eq!(config.retry.max_attempts.max(1), 1);
    }

    // Sha256 accumulation over chunks must match the whole-buffer digest.
    #[test]
    fn test_chunked_digest_matches_whole_digest() {
        let payload = vec![7u8; 20_000];
        let mut hasher = Sha256::new();
        for chunk in payload.chunks(8192) {
            hasher.update(chunk);
        }
        assert_eq!(
            format!("{:x}", hasher.finalize()),
            persistence::sha256_hex(&payload)
        );
    }
}
