//! Convert a saved full model to the lightweight inference format.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use supres_core::{ModelConverter, PipelineConfig};

/// Load a trained full model from disk and export it to the lightweight
/// inference format
#[derive(Parser, Debug)]
#[command(name = "convert-model", version, about, long_about = None)]
struct Cli {
    /// Saved full model to convert
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output artifact path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    supres_cli::logging::init(cli.verbose, cli.quiet);

    let mut config = PipelineConfig::default();
    if let Some(input) = cli.input {
        config.full_model_path = input;
    }
    if let Some(output) = cli.output {
        config.artifact_path = output;
    }

    let report = ModelConverter::new(config)
        .convert()
        .context("Error during conversion")?;

    tracing::info!(
        path = %report.output_path.display(),
        bytes = report.output_size_bytes,
        ratio = report.compression_ratio,
        sha256 = %report.sha256,
        "Conversion completed successfully"
    );
    Ok(())
}
