//! Shared test utilities for the picture-shrinker test suite.
//!
//! Provides synthetic picture writers and small filesystem helpers for
//! building input trees and inspecting mirrored output trees.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("photos/a.jpg"), 400, 300);
//! write_file(&tmp.path().join("photos/notes.txt"), "hello");
//!
//! assert_eq!(list_files(&tmp.path().join("photos")), ["a.jpg", "notes.txt"]);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic pictures
// =========================================================================

/// Write a valid JPEG of the given size, creating parent directories.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_dir(path);
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a valid RGBA PNG of the given size, creating parent directories.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    ensure_dir(path);
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, (x % 2 * 255) as u8])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

// =========================================================================
// Plain files
// =========================================================================

/// Write arbitrary bytes, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    ensure_dir(path);
    std::fs::write(path, contents).unwrap();
}

fn ensure_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

/// All files under `root` as sorted `/`-separated relative paths.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}
