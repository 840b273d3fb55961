//! Batch processing command for multiple bills.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billex_core::document::extension_of;
use billex_core::{
    BillPipeline, Document, DocumentKind, Extraction, OcrBackend, Variant, backend_from_config,
};

use super::{VariantArg, load_config, with_model_dir};
use crate::output::{OutputFormat, render};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output shape
    #[arg(long, value_enum, default_value = "invoice")]
    variant: VariantArg,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<Extraction>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = with_model_dir(load_config(config_path)?, args.model_dir.clone());

    let files = matching_files(&args.input)?;
    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pipeline = BillPipeline::new(backend_from_config(&config)?, &config);
    let variant = Variant::from(args.variant);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &pipeline, variant);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(extraction) => results.push(ProcessResult {
                path,
                extraction: Some(extraction),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        extraction: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            let Some(extraction) = &result.extraction else {
                continue;
            };
            let stem = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bill");
            let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));

            fs::write(&output_path, render(extraction, args.format, true)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Expand the glob, keeping files with a supported extension.
fn matching_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob(pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.to_str()
                .and_then(extension_of)
                .is_some_and(|ext| DocumentKind::from_extension(&ext).is_ok())
        })
        .collect();
    files.sort();
    Ok(files)
}

fn process_single_file<R: OcrBackend>(
    path: &Path,
    pipeline: &BillPipeline<R>,
    variant: Variant,
) -> anyhow::Result<Extraction> {
    let name = path.file_name().and_then(|n| n.to_str());
    let bytes = fs::read(path)?;
    let kind = DocumentKind::detect(name, &bytes)?;

    Ok(pipeline.run(&Document::new(kind, bytes), variant)?)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "bill_no",
        "bill_date",
        "final_total",
        "item_count",
        "anomaly_count",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();
        let time = result.processing_time_ms.to_string();

        let record = match &result.extraction {
            Some(Extraction::Invoice(invoice)) => [
                filename,
                "success".to_string(),
                invoice.bill_no.clone().unwrap_or_default(),
                invoice.bill_date.clone().unwrap_or_default(),
                invoice.final_total.to_string(),
                invoice.line_items.len().to_string(),
                invoice.anomalies.len().to_string(),
                time,
                String::new(),
            ],
            Some(Extraction::Pagewise(response)) => [
                filename,
                "success".to_string(),
                String::new(),
                String::new(),
                String::new(),
                response.data.total_item_count.to_string(),
                String::new(),
                time,
                String::new(),
            ],
            None => [
                filename,
                "error".to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                time,
                result.error.clone().unwrap_or_default(),
            ],
        };
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use billex_core::{BillexConfig, StaticTextRecognizer};

    #[test]
    fn test_matching_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PDF", "notes.txt", "scan.jpeg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.png")).unwrap();

        let pattern = format!("{}/*", dir.path().display());
        let names: Vec<String> = matching_files(&pattern)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.PDF", "b.png", "scan.jpeg"]);
    }

    #[test]
    fn test_summary_rows() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = BillPipeline::new(
            StaticTextRecognizer::new("unused"),
            &BillexConfig::default(),
        );

        let bad = dir.path().join("broken.png");
        fs::write(&bad, b"not an image").unwrap();
        let err = process_single_file(&bad, &pipeline, Variant::Invoice).unwrap_err();

        let results = vec![ProcessResult {
            path: bad,
            extraction: None,
            error: Some(err.to_string()),
            processing_time_ms: 3,
        }];
        let summary = dir.path().join("summary.csv");
        write_summary(&summary, &results).unwrap();

        let content = fs::read_to_string(summary).unwrap();
        let row = content.lines().nth(1).unwrap();
        assert!(row.starts_with("broken.png,error,,,,,,3,"));
    }
}
