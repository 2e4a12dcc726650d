//! Mirrored output tree.
//!
//! Every source file lands at the same relative position under the output
//! root that it had under the input root:
//!
//! ```text
//! photos/2023/beach.JPG   →  _resized_pictures/2023/beach.jpg
//! photos/2023/notes.txt   →  _resized_pictures/2023/notes.txt
//! ```
//!
//! Resized pictures take the extension of the output format; pass-through
//! files keep their name unchanged. Nothing under the input root is ever
//! written to.

use crate::imaging::OutputFormat;
use crate::scan::{Route, SourceFile};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Reparent `source` from `input_root` to `output_root`.
///
/// When `source` does not live under `input_root`, its normal components are
/// reinterpreted under `output_root` instead (root, prefix and `..` are
/// dropped), so the destination can never escape the output root.
pub fn map_to_output(source: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    match source.strip_prefix(input_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => output_root.join(relative),
        _ => {
            let relative: PathBuf = source
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            output_root.join(relative)
        }
    }
}

/// Destination for a routed file: resized pictures get the format's extension.
pub fn destination(
    file: &SourceFile,
    input_root: &Path,
    output_root: &Path,
    format: OutputFormat,
) -> PathBuf {
    let mut dest = map_to_output(&file.path, input_root, output_root);
    if file.route == Route::Resizable {
        dest.set_extension(format.extension());
    }
    dest
}

/// Create every missing ancestor of `destination`.
///
/// Idempotent, and safe when sibling workers race to create the same
/// directory: an existing directory counts as success.
pub fn ensure_parent(destination: &Path) -> io::Result<()> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Byte-for-byte copy, overwriting an existing destination.
///
/// The destination's parent must exist; see [`ensure_parent`].
pub fn copy_through(source: &Path, destination: &Path) -> io::Result<u64> {
    std::fs::copy(source, destination)
}
