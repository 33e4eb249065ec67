//! Shared pieces of the pipeline binaries.

pub mod logging;
