//! Define the FSRCNN x2 network and export the lightweight artifact.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use supres_core::{ModelDefiner, PipelineConfig};

/// Build the FSRCNN x2 network with untrained weights and export it to
/// the lightweight inference format
#[derive(Parser, Debug)]
#[command(name = "create-model", version, about, long_about = None)]
struct Cli {
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
    if let Some(output) = cli.output {
        config.artifact_path = output;
    }

    let report = ModelDefiner::new(config)
        .define()
        .context("Error creating model")?;

    tracing::info!(
        path = %report.output_path.display(),
        bytes = report.output_size_bytes,
        sha256 = %report.sha256,
        "Model created and saved successfully"
    );
    Ok(())
}
