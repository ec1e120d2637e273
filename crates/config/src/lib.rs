use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main scan configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Reader-level scan settings
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Configuration for predicate-aware file scans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of rows per decoded record batch (default: 8192)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Apply column projection when the batch reader is built (default: true).
    /// When false, only row-group selection is pushed down and the caller
    /// projects the returned batches itself.
    #[serde(default = "default_enforce_projection")]
    pub enforce_projection: bool,

    /// Skip row groups using column chunk statistics (default: true)
    #[serde(default = "default_statistics_pruning")]
    pub statistics_pruning: bool,
}

// Default value functions
fn default_batch_size() -> usize {
    8192
}

fn default_enforce_projection() -> bool {
    true
}

fn default_statistics_pruning() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            enforce_projection: default_enforce_projection(),
            statistics_pruning: default_statistics_pruning(),
        }
    }
}

impl Config {
    /// Load Config with layered configuration priority:
    /// 1. Default values
    /// 2. TOML file (if provided)
    /// 3. Environment variables (`SCANPRUNE_` prefix, `__` between sections,
    ///    e.g. `SCANPRUNE_SCAN__BATCH_SIZE=1024`)
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_layers(config_file, None)
    }

    /// Layered load reading variables from `env` instead of the process
    /// environment when given
    fn load_layers(config_file: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("scan.batch_size", default_batch_size() as u64)?
            .set_default("scan.enforce_projection", default_enforce_projection())?
            .set_default("scan.statistics_pruning", default_statistics_pruning())?;

        if let Some(path) = config_file {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCANPRUNE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let scan_config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        scan_config.validate()?;
        Ok(scan_config)
    }

    /// Load Config from a TOML file. Environment variables still override file values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Create a new Config from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()
    }
}

impl ScanConfig {
    /// Validate the scan configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.batch_size > 0, "scan batch_size must be greater than zero");
        Ok(())
    }
}
