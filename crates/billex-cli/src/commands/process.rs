//! Process command - extract data from a single bill.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use billex_core::document::http_client;
use billex_core::{BillPipeline, DocumentSource, Upload, backend_from_config};

use super::{VariantArg, load_config, with_model_dir};
use crate::output::{OutputFormat, render};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image) or an http(s) URL
    #[arg(required = true)]
    input: String,

    /// Output shape
    #[arg(long, value_enum, default_value = "invoice")]
    variant: VariantArg,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = with_model_dir(load_config(config_path)?, args.model_dir.clone());

    let source = if is_url(&args.input) {
        DocumentSource::Url(args.input.clone())
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        let filename = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
        DocumentSource::Upload(Upload::new(filename, fs::read(&path)?))
    };

    info!("Processing {}", args.input);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading document...");
    let client = http_client(config.server.fetch_timeout_secs)?;
    let document = source.acquire(&client).await?;

    pb.set_message("Loading OCR models...");
    let pipeline = BillPipeline::new(backend_from_config(&config)?, &config);

    pb.set_message("Extracting...");
    let extraction = pipeline.run(&document, args.variant.into());
    pb.finish_and_clear();
    let extraction = extraction?;

    let output = render(&extraction, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
