//! # Picture Shrinker
//!
//! Batch picture resizer. Point it at a file or a directory tree and it writes
//! a mirrored copy of the tree under an output root, with every picture resized
//! by one rule and every other file copied unchanged.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      photos/  →  [SourceFile]          (walk + route by extension)
//! 2. Process   [SourceFile] → _resized_pictures/ (copy or decode/resize/encode)
//! ```
//!
//! The input tree is never written to. Per-item failures are reported and the
//! batch carries on; only setup errors (bad size option, missing input) stop a
//! run, and they do so before any output exists.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: format routing and the lazy recursive walk |
//! | [`process`] | Stage 2: parallel pipeline, per-item reports, run summary |
//! | [`mirror`] | Output path mapping, directory creation, pass-through copies |
//! | [`imaging`] | Orientation, ratio-preserving sizing, and the `image`-crate backend |
//! | [`config`] | `picture-shrinker.toml` loading, layering, and validation |
//! | [`output`] | CLI output formatting for progress events and the summary |
//!
//! # Resize Modes
//!
//! Exactly one mode is active per run:
//!
//! - **Greater side**: the longer side becomes the target.
//! - **Lesser side**: the shorter side becomes the target.
//! - **Multiplier**: both sides scale by a positive factor.
//!
//! The other side always follows the picture's own aspect ratio. Orientation
//! is taken from each picture's current dimensions, so a mixed folder of
//! landscape and portrait shots comes out consistently sized.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling and encoding all go through the `image`
//! crate. No ImageMagick, no system libraries: the binary is self-contained.

pub mod config;
pub mod imaging;
pub mod mirror;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
