//! Input discovery: format routing and the recursive tree walk.
//!
//! Stage 1 of a shrink run. Turns the path given on the command line into the
//! list of files to process, each tagged with the branch it will take.
//!
//! ## Routing
//!
//! A file is [`Route::Resizable`] when its extension is in
//! [`IMAGE_EXTENSIONS`] (compared case-insensitively), and
//! [`Route::PassThrough`] otherwise. Pass-through files are copied byte for
//! byte; resizable files are decoded, resized and re-encoded.
//!
//! ## Walk
//!
//! ```text
//! photos/                  ← input root
//! ├── 2023/
//! │   ├── beach.JPG        → Resizable
//! │   └── notes.txt        → PassThrough
//! └── cover.png            → Resizable
//! ```
//!
//! Directories are traversed but never yielded. Entries are visited in file
//! name order so runs are reproducible, though nothing downstream depends on
//! it. When the output root sits inside the input tree it is pruned from the
//! walk so a run never picks up its own results.
//!
//! Symbolic links are followed. Link loops and dangling links come back as
//! [`ScanFailure`]s and are reported per item.
//!
//! An output root that equals or contains the input root is rejected before
//! anything is read: destinations would land on top of the sources.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),
    #[error("Output root {output} must not be or contain the input {input}")]
    OutputContainsInput { input: PathBuf, output: PathBuf },
}

/// Extensions routed to the resize branch.
///
/// `psd` is not listed: the `image` crate has no Photoshop decoder, so those
/// files are copied through.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpe", "jpeg", "png", "webp", "tif"];

/// Which branch of the pipeline a file takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Resizable,
    PassThrough,
}

/// Classify a path by its extension.
pub fn route(path: &Path) -> Route {
    let resizable = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)));
    if resizable {
        Route::Resizable
    } else {
        Route::PassThrough
    }
}

/// A discovered file and its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub route: Route,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let route = route(&path);
        Self { path, route }
    }
}

/// A directory entry the walker could not read.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: walkdir::Error,
}

/// Result of discovering the work for one run.
#[derive(Debug)]
pub struct Scan {
    /// Root that destination paths are made relative to.
    pub input_root: PathBuf,
    pub files: Vec<SourceFile>,
    pub failures: Vec<ScanFailure>,
}

impl Scan {
    pub fn resizable_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.route == Route::Resizable)
            .count()
    }
}

/// Lazily walk every file under `root`, skipping the `exclude` subtree.
///
/// The sequence is finite and single-pass; errors are yielded in place of
/// the entries that could not be read.
pub fn walk_files(
    root: &Path,
    exclude: Option<PathBuf>,
) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| exclude.as_deref() != Some(e.path()))
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
}

/// Where `output_root` appears inside the walk of `input_root`, if it does.
///
/// Both paths are canonicalized for the comparison; the returned path is
/// spelled the way the walker will spell it (`input_root` joined with the
/// relative remainder).
fn nested_output(input_root: &Path, output_root: &Path) -> Option<PathBuf> {
    let input = input_root.canonicalize().ok()?;
    let output = output_root.canonicalize().ok()?;
    let relative = output.strip_prefix(&input).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(input_root.join(relative))
}

/// Fail when `output_root` is `input_root` or one of its ancestors.
///
/// An output root that does not exist yet cannot contain anything.
fn check_output_root(input_root: &Path, output_root: &Path) -> Result<(), ScanError> {
    let input = input_root.canonicalize()?;
    let Ok(output) = output_root.canonicalize() else {
        return Ok(());
    };
    if input.starts_with(&output) {
        return Err(ScanError::OutputContainsInput {
            input: input_root.to_path_buf(),
            output: output_root.to_path_buf(),
        });
    }
    Ok(())
}

/// Discover the files to process for `input`.
///
/// A directory is walked recursively and becomes the input root. A single
/// file is its own work list, rooted at its parent directory.
pub fn scan(input: &Path, output_root: &Path) -> Result<Scan, ScanError> {
    let metadata = match std::fs::metadata(input) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScanError::InputNotFound(input.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_dir() {
        let input_root = input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        check_output_root(&input_root, output_root)?;
        return Ok(Scan {
            input_root,
            files: vec![SourceFile::new(input.to_path_buf())],
            failures: Vec::new(),
        });
    }

    check_output_root(input, output_root)?;
    // Reading the root itself must succeed; failures deeper down are per item.
    std::fs::read_dir(input)?;

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for entry in walk_files(input, nested_output(input, output_root)) {
        match entry {
            Ok(path) => files.push(SourceFile::new(path)),
            Err(error) => failures.push(ScanFailure {
                path: error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| input.to_path_buf()),
                error,
            }),
        }
    }

    Ok(Scan {
        input_root: input.to_path_buf(),
        files,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{list_files, write_file};
    use tempfile::TempDir;

    // =========================================================================
    // Routing
    // =========================================================================

    #[test]
    fn route_recognizes_every_image_extension() {
        for ext in IMAGE_EXTENSIONS {
            let path = PathBuf::from(format!("dir/photo.{ext}"));
            assert_eq!(route(&path), Route::Resizable, "{ext}");
        }
    }

    #[test]
    fn route_is_case_insensitive() {
        assert_eq!(route(Path::new("IMG_001.JPG")), Route::Resizable);
        assert_eq!(route(Path::new("scan.Tif")), Route::Resizable);
        assert_eq!(route(Path::new("x.WebP")), Route::Resizable);
    }

    #[test]
    fn route_passes_through_everything_else() {
        assert_eq!(route(Path::new("notes.txt")), Route::PassThrough);
        assert_eq!(route(Path::new("layers.psd")), Route::PassThrough);
        assert_eq!(route(Path::new("scan.tiff")), Route::PassThrough);
        assert_eq!(route(Path::new("anim.gif")), Route::PassThrough);
        assert_eq!(route(Path::new("Makefile")), Route::PassThrough);
        assert_eq!(route(Path::new(".jpg")), Route::PassThrough);
    }

    #[test]
    fn route_matches_whole_extension_only() {
        assert_eq!(route(Path::new("photo.jpg.bak")), Route::PassThrough);
        assert_eq!(route(Path::new("photo.xjpg")), Route::PassThrough);
    }

    // =========================================================================
    // Walking
    // =========================================================================

    #[test]
    fn walk_yields_files_only_recursively() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("a.jpg"), "a");
        write_file(&tmp.path().join("sub/b.txt"), "b");
        write_file(&tmp.path().join("sub/deeper/c.png"), "c");
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let found: Vec<PathBuf> = walk_files(tmp.path(), None)
            .map(|r| r.unwrap().strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("sub/b.txt"),
                PathBuf::from("sub/deeper/c.png"),
            ]
        );
    }

    #[test]
    fn walk_skips_excluded_subtree() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("keep.jpg"), "a");
        write_file(&tmp.path().join("out/old.jpg"), "b");

        let found: Vec<PathBuf> = walk_files(tmp.path(), Some(tmp.path().join("out")))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(found, vec![tmp.path().join("keep.jpg")]);
    }

    // =========================================================================
    // Scan
    // =========================================================================

    #[test]
    fn scan_directory_routes_files() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photos");
        write_file(&input.join("a.jpeg"), "a");
        write_file(&input.join("b/readme.md"), "b");

        let scan = scan(&input, &tmp.path().join("out")).unwrap();

        assert_eq!(scan.input_root, input);
        assert_eq!(
            scan.files,
            vec![
                SourceFile {
                    path: input.join("a.jpeg"),
                    route: Route::Resizable
                },
                SourceFile {
                    path: input.join("b/readme.md"),
                    route: Route::PassThrough
                },
            ]
        );
        assert_eq!(scan.resizable_count(), 1);
        assert!(scan.failures.is_empty());
    }

    #[test]
    fn scan_single_file_is_rooted_at_parent() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("dir/pic.png");
        write_file(&file, "x");

        let scan = scan(&file, &tmp.path().join("out")).unwrap();
        assert_eq!(scan.input_root, tmp.path().join("dir"));
        assert_eq!(scan.files, vec![SourceFile::new(file)]);
    }

    #[test]
    fn scan_missing_input_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&tmp.path().join("nope"), &tmp.path().join("out"));
        assert!(matches!(result, Err(ScanError::InputNotFound(_))));
    }

    #[test]
    fn scan_excludes_output_nested_in_input() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photos");
        write_file(&input.join("a.jpg"), "a");
        write_file(&input.join("_resized/a.jpg"), "previous run");

        let scan = scan(&input, &input.join("_resized")).unwrap();
        assert_eq!(scan.files, vec![SourceFile::new(input.join("a.jpg"))]);
        assert_eq!(list_files(&input), ["_resized/a.jpg", "a.jpg"]);
    }

    #[test]
    fn scan_rejects_output_equal_to_input() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("photos");
        write_file(&input.join("a.jpg"), "a");

        // Spelled differently, same directory.
        let result = scan(&input, &tmp.path().join("photos/../photos"));
        assert!(matches!(
            result,
            Err(ScanError::OutputContainsInput { .. })
        ));
    }

    #[test]
    fn scan_rejects_output_that_contains_input() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("out/photos");
        write_file(&input.join("photos/a.txt"), "would be overwritten");

        let result = scan(&input, &tmp.path().join("out"));
        assert!(matches!(
            result,
            Err(ScanError::OutputContainsInput { .. })
        ));
    }

    #[test]
    fn scan_rejects_single_file_whose_parent_is_output() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("dir/pic.png");
        write_file(&file, "x");

        let result = scan(&file, &tmp.path().join("dir"));
        assert!(matches!(
            result,
            Err(ScanError::OutputContainsInput { .. })
        ));
    }

    #[test]
    fn scan_accepts_missing_or_sibling_output() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&input.join("a.txt"), "a");
        std::fs::create_dir_all(tmp.path().join("out")).unwrap();

        assert!(scan(&input, &tmp.path().join("out")).is_ok());
        assert!(scan(&input, &tmp.path().join("not-yet")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn walk_follows_symlinked_files_and_dirs() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&tmp.path().join("real.txt"), "real");
        write_file(&tmp.path().join("shared/b.jpg"), "b");
        write_file(&input.join("plain.txt"), "plain");
        symlink(tmp.path().join("real.txt"), input.join("link.txt")).unwrap();
        symlink(tmp.path().join("shared"), input.join("shared")).unwrap();

        let scan = scan(&input, &tmp.path().join("out")).unwrap();
        let paths: Vec<PathBuf> = scan.files.into_iter().map(|f| f.path).collect();
        assert_eq!(
            paths,
            vec![
                input.join("link.txt"),
                input.join("plain.txt"),
                input.join("shared/b.jpg"),
            ]
        );
        assert!(scan.failures.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_a_scan_failure() {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        write_file(&input.join("ok.txt"), "ok");
        symlink(tmp.path().join("gone.txt"), input.join("broken.txt")).unwrap();

        let scan = scan(&input, &tmp.path().join("out")).unwrap();
        assert_eq!(scan.files, vec![SourceFile::new(input.join("ok.txt"))]);
        assert_eq!(scan.failures.len(), 1);
        assert_eq!(scan.failures[0].path, input.join("broken.txt"));
    }

    #[test]
    fn nested_output_ignores_sibling_and_identical_roots() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let sibling = tmp.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&sibling).unwrap();

        assert_eq!(nested_output(&input, &sibling), None);
        assert_eq!(nested_output(&input, &input), None);
        assert_eq!(nested_output(&input, &tmp.path().join("missing")), None);
    }
}
