//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{Dimensions, ResizeMode, SizeError, calculate_resize, is_upscale};
use super::params::{OutputFormat, Quality, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShrinkError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Size(#[from] SizeError),
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ShrinkError>;

/// Get picture dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    Ok(backend.identify(path)?)
}

/// Configuration shared by every picture of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkConfig {
    pub mode: ResizeMode,
    pub format: OutputFormat,
    pub quality: Quality,
    /// When false, pictures that would grow are re-encoded at their current size.
    pub upscale: bool,
}

impl ShrinkConfig {
    pub fn new(mode: ResizeMode) -> Self {
        Self {
            mode,
            format: OutputFormat::default(),
            quality: Quality::default(),
            upscale: true,
        }
    }
}

/// Sizes before and after one shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkOutcome {
    pub original: Dimensions,
    pub resized: Dimensions,
}

/// Decide the output size for `original` under `config`.
pub fn plan_size(original: Dimensions, config: &ShrinkConfig) -> Result<Dimensions> {
    let resized = calculate_resize(original, config.mode)?;
    if !config.upscale && is_upscale(original, resized) {
        return Ok(original);
    }
    Ok(resized)
}

/// Identify, size and re-encode one picture from `source` into `output`.
pub fn shrink_picture(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &ShrinkConfig,
) -> Result<ShrinkOutcome> {
    let original = get_dimensions(backend, source)?;
    let resized = plan_size(original, config)?;

    backend.resize(&ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width: resized.width,
        height: resized.height,
        format: config.format,
        quality: config.quality,
    })?;

    Ok(ShrinkOutcome { original, resized })
}
