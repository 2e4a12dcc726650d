//! Shrinker configuration.
//!
//! Handles loading, validating, and merging `picture-shrinker.toml`. Stock
//! defaults are overridden by the config file, and the config file is
//! overridden by command-line flags (applied in `main`).
//!
//! ## Config File Location
//!
//! `--config PATH` names the file explicitly. Without it, a
//! `picture-shrinker.toml` in the working directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! root = "_resized_pictures"  # Where the mirrored tree is written
//! format = "jpeg"             # jpeg | png | webp (lossless)
//! quality = 90                # JPEG quality (1-100)
//!
//! [resize]
//! upscale = true              # false: never enlarge, keep the original size
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "picture-shrinker.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration for a shrink run.
///
/// All fields have defaults. Config files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkerConfig {
    /// Output tree location and encoding.
    pub output: OutputConfig,
    /// Resize policy.
    pub resize: ResizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ShrinkerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output.root must not be empty".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output tree settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Root of the mirrored output tree.
    pub root: PathBuf,
    /// Container every resized picture is written as.
    pub format: OutputFormat,
    /// Lossy encoding quality.
    pub quality: u32,
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("_resized_pictures"),
            format: OutputFormat::default(),
            quality: Quality::default().value(),
        }
    }
}

/// Resize policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Allow target sizes larger than the source picture.
    pub upscale: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self { upscale: true }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that a config file is merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ShrinkerConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ShrinkerConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ShrinkerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration.
///
/// An `explicit` path must exist. Otherwise [`CONFIG_FILE_NAME`] in
/// `working_dir` is used if present, and stock defaults if not.
pub fn load_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<ShrinkerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = working_dir.join(CONFIG_FILE_NAME);
            if implicit.is_file() {
                Some(load_raw_config(&implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}
