//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod process;
pub mod serve;

use std::path::{Path, PathBuf};

use tracing::debug;

use billex_core::{BillexConfig, Variant};

/// Output shape selectable on the command line.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum VariantArg {
    /// One aggregated invoice with reconciliation
    #[default]
    Invoice,
    /// Table rows per page
    Pagewise,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Invoice => Variant::Invoice,
            VariantArg::Pagewise => Variant::Pagewise,
        }
    }
}

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billex")
        .join("config.json")
}

/// Load the configuration for a processing command.
///
/// An explicit path must exist. Otherwise the user configuration file is
/// used when present, and built-in defaults when not.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillexConfig> {
    if let Some(path) = config_path {
        let path = Path::new(path);
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(BillexConfig::from_file(path)?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(BillexConfig::from_file(&default_path)?)
    } else {
        Ok(BillexConfig::default())
    }
}

/// Apply a `--model-dir` override.
pub fn with_model_dir(mut config: BillexConfig, model_dir: Option<PathBuf>) -> BillexConfig {
    if model_dir.is_some() {
        config.models.model_dir = model_dir;
    }
    config
}
