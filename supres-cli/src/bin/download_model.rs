//! Download the pre-trained FSRCNN x2 artifact.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use supres_core::{ArtifactDownloader, PipelineConfig};

/// Download the pre-trained lightweight model artifact
#[derive(Parser, Debug)]
#[command(name = "download-model", version, about, long_about = None)]
struct Cli {
    /// Source URL of the pre-trained artifact
    #[arg(short, long)]
    url: Option<String>,

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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    supres_cli::logging::init(cli.verbose, cli.quiet);

    let mut config = PipelineConfig::default();
    if let Some(url) = cli.url {
        config.model_url = url;
    }
    if let Some(output) = cli.output {
        config.artifact_path = output;
    }

    let report = ArtifactDownloader::new(config)?
        .download()
        .await
        .context("Error downloading model")?;

    tracing::info!(
        path = %report.output_path.display(),
        bytes = report.size_bytes,
        attempts = report.attempts,
        sha256 = %report.sha256,
        "Model downloaded successfully"
    );
    Ok(())
}
