//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Size** | [`calculate_resize`] (orientation-aware, ratio-preserving) |
//! | **Resize → JPEG/PNG/WebP** | Lanczos3 + `image` encoders |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    Dimensions, Orientation, ResizeMode, SizeError, calculate_resize, is_upscale,
};
pub use operations::{ShrinkConfig, ShrinkError, ShrinkOutcome, shrink_picture};
pub use params::{OutputFormat, Quality, ResizeParams};
pub use rust_backend::RustBackend;
