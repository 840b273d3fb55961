//! Serve command - run the HTTP API.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use billex_core::backend_from_config;

use super::{load_config, with_model_dir};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long)]
    bind: Option<String>,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = with_model_dir(load_config(config_path)?, args.model_dir);
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let backend = backend_from_config(&config)?;
    info!("Starting bill extraction API on {}", config.server.bind);

    billex_server::serve(&config, backend).await?;
    Ok(())
}
