//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content-sniffed format |
//! | Normalize | `DynamicImage::to_rgb8` / `to_rgba8` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality from params) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! The format is sniffed from file content rather than the extension, so
//! `.jpe` files and mislabelled files decode as whatever they really are.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{OutputFormat, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a reader with the format guessed from the file's magic bytes.
fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    // Camera originals routinely exceed the default allocation limit.
    reader.no_limits();
    Ok(reader)
}

/// Load and decode a picture from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
}

/// Convert to the 8-bit channel layout the target encoder accepts.
///
/// Palette and 16-bit images are expanded; alpha is kept only when the
/// output format can store it.
fn normalize(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    if format.supports_alpha() && img.color().has_alpha() {
        match img {
            DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        }
    } else {
        match img {
            DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }
    }
}

/// Encode `img` to `path` in the given format.
///
/// A partially written file is removed when encoding fails.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u32,
) -> Result<(), BackendError> {
    let file = File::create(path)
        .map_err(|e| BackendError::Encode(format!("cannot create {}: {}", path.display(), e)))?;
    let writer = BufWriter::new(file);
    let result = match format {
        OutputFormat::Jpeg => img.write_with_encoder(JpegEncoder::new_with_quality(
            writer,
            quality.clamp(1, 100) as u8,
        )),
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(writer)),
        OutputFormat::Webp => img.write_with_encoder(WebPEncoder::new_lossless(writer)),
    };
    result.map_err(|e| {
        let _ = std::fs::remove_file(path);
        BackendError::Encode(format!("{} as {}: {}", path.display(), format, e))
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = normalize(load_image(&params.source)?, params.format);
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        drop(img);
        save_image(
            &resized,
            &params.output,
            params.format,
            params.quality.value(),
        )
    }
}
