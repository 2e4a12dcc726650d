//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the [`MockBackend`](tests::MockBackend) below.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

pub use super::calculations::Dimensions;

/// Backend failures.
///
/// `Io` covers reading the source; failures to create or write the output
/// are reported as `Encode`.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Trait for image processing backends.
///
/// Implementations own the decoded picture for the duration of one call and
/// release it before returning, on success and on every error path.
pub trait ImageBackend: Sync {
    /// Get picture dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode `params.source`, resize it to exactly `params.width x params.height`
    /// and encode it to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
