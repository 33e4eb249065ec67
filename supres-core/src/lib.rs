//! # supres-core — FSRCNN x2 model artifact pipeline
//!
//! Library behind the three `supres-cli` entry points that produce the
//! lightweight super-resolution model artifact the mobile app ships:
//!
//! 1. **Define** — build the fixed FSRCNN topology with untrained weights
//!    and export it ([`define::ModelDefiner`]).
//! 2. **Convert** — load a trained full model from disk and export it
//!    ([`convert::ModelConverter`]).
//! 3. **Download** — stream a pre-trained artifact over HTTP
//!    ([`download::ArtifactDownloader`]).
//!
//! The three are alternatives, not a pipeline: each run produces the
//! complete artifact at [`config::PipelineConfig::artifact_path`]. All
//! writes are atomic (tmp-then-rename) and every failure surfaces as a
//! [`error::PipelineError`] so callers can exit non-zero.

pub mod config;
pub mod convert;
pub mod define;
pub mod download;
pub mod error;
pub mod lite;
pub mod model;
pub mod persistence;

pub use config::{PipelineConfig, RetryPolicy};
pub use convert::{ConversionReport, ModelConverter};
pub use define::{CreateReport, ModelDefiner};
pub use download::{ArtifactDownloader, DownloadReport};
pub use error::PipelineError;
pub use lite::LiteModel;
pub use model::{ModelSpec, SavedModel};
