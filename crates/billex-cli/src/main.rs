//! CLI application for bill and invoice extraction.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, config, parse, process, serve};

/// Bill OCR - extract line items and totals from bills and invoices
#[derive(Parser)]
#[command(name = "billex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract data from a single document (file or URL)
    Process(process::ProcessArgs),

    /// Parse already-recognized text
    Parse(parse::ParseArgs),

    /// Process multiple documents
    Batch(batch::BatchArgs),

    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // Logs go to stderr so stdout carries only extraction output.
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_writer(std::io::stderr);

    if matches!(cli.command, Commands::Serve(_)) {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .from_env_lossy();
        tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_max_level(level).finish())?;
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Parse(args) => parse::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
