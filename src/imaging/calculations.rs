//! Pure calculation functions for picture dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding
//!
//! Every derived side is rounded with [`f64::round`], i.e. to the nearest
//! integer with ties resolved away from zero. The same rule is used on both
//! axes so that deriving height from width and width from height agree.
//!
//! ## Limits
//!
//! Sides are computed in `f64` and checked before narrowing to `u32`. A
//! result larger than [`MAX_OUTPUT_PIXELS`] is rejected as
//! [`SizeError::InvalidSize`], so an oversized target fails one picture
//! instead of exhausting memory in the resampler.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SizeError {
    #[error("Invalid size: {0}")]
    InvalidSize(String),
    #[error("Degenerate picture: {width}x{height} has no aspect ratio")]
    DegeneratePicture { width: u32, height: u32 },
}

/// Largest accepted output size in pixels (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Round a computed side and narrow it to `u32`.
fn to_side(value: f64) -> Result<u32, SizeError> {
    let side = value.round();
    if side > u32::MAX as f64 {
        return Err(SizeError::InvalidSize(format!(
            "computed side of {side} pixels is out of range"
        )));
    }
    Ok(side as u32)
}

/// Picture orientation, derived from the current dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Classify `width x height`. Equal sides are [`Orientation::Square`].
    pub fn classify(width: u32, height: u32) -> Self {
        match width.cmp(&height) {
            std::cmp::Ordering::Greater => Orientation::Landscape,
            std::cmp::Ordering::Less => Orientation::Portrait,
            std::cmp::Ordering::Equal => Orientation::Square,
        }
    }
}

/// How a picture should be resized. Exactly one mode is active per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeMode {
    /// Set the smaller side to the target, scale the other proportionally.
    LesserSize(u32),
    /// Set the larger side to the target, scale the other proportionally.
    GreaterSize(u32),
    /// Scale both sides by a factor (height follows the rounded width).
    Multiplier(f64),
}

impl ResizeMode {
    /// Reject non-positive targets and non-finite multipliers.
    pub fn validate(&self) -> Result<(), SizeError> {
        match *self {
            ResizeMode::LesserSize(0) | ResizeMode::GreaterSize(0) => Err(
                SizeError::InvalidSize("target size must be a positive integer".into()),
            ),
            ResizeMode::Multiplier(f) if !f.is_finite() || f <= 0.0 => Err(
                SizeError::InvalidSize(format!("multiplier must be a positive number, got {f}")),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeMode::LesserSize(s) => write!(f, "lesser side {s}px"),
            ResizeMode::GreaterSize(s) => write!(f, "greater side {s}px"),
            ResizeMode::Multiplier(m) => write!(f, "x{m}"),
        }
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn orientation(self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }

    /// Width to height ratio. Callers must rule out a zero height first.
    fn side_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// New size with the given width, height derived from the current ratio.
    fn with_width(self, width: u32) -> Result<Dimensions, SizeError> {
        let height = to_side(width as f64 / self.side_ratio())?;
        Ok(Dimensions { width, height })
    }

    /// New size with the given height, width derived from the current ratio.
    fn with_height(self, height: u32) -> Result<Dimensions, SizeError> {
        let width = to_side(height as f64 * self.side_ratio())?;
        Ok(Dimensions { width, height })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Compute the ratio-preserving size of `current` under `mode`.
///
/// Orientation is classified from `current` on every call. Square pictures
/// take the landscape branch: width is the greater side and height the lesser.
///
/// # Examples
/// ```
/// # use picture_shrinker::imaging::{Dimensions, ResizeMode, calculate_resize};
/// let size = calculate_resize(Dimensions::new(4000, 3000), ResizeMode::LesserSize(1350));
/// assert_eq!(size.unwrap(), Dimensions::new(1800, 1350));
/// ```
pub fn calculate_resize(current: Dimensions, mode: ResizeMode) -> Result<Dimensions, SizeError> {
    mode.validate()?;
    if current.width == 0 || current.height == 0 {
        return Err(SizeError::DegeneratePicture {
            width: current.width,
            height: current.height,
        });
    }

    let portrait = current.orientation() == Orientation::Portrait;
    let resized = match mode {
        ResizeMode::Multiplier(factor) => {
            current.with_width(to_side(current.width as f64 * factor)?)
        }
        ResizeMode::GreaterSize(target) if portrait => current.with_height(target),
        ResizeMode::GreaterSize(target) => current.with_width(target),
        ResizeMode::LesserSize(target) if portrait => current.with_width(target),
        ResizeMode::LesserSize(target) => current.with_height(target),
    }?;

    if resized.width == 0 || resized.height == 0 {
        return Err(SizeError::InvalidSize(format!(
            "{mode} collapses {current} to {resized}"
        )));
    }
    if u64::from(resized.width) * u64::from(resized.height) > MAX_OUTPUT_PIXELS {
        return Err(SizeError::InvalidSize(format!(
            "{mode} enlarges {current} to {resized}, over the {MAX_OUTPUT_PIXELS} pixel limit"
        )));
    }
    Ok(resized)
}

/// Whether `resized` is larger than `current` on either side.
pub fn is_upscale(current: Dimensions, resized: Dimensions) -> bool {
    resized.width > current.width || resized.height > current.height
}
