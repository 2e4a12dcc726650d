//! The picture pipeline.
//!
//! Stage 2 of a shrink run. Takes the files discovered by [`scan`] and routes
//! each one through the copy branch or the resize branch, writing results into
//! the mirrored output tree.
//!
//! ## Per-item state machine
//!
//! ```text
//! Discovered → Classified → Preparing → Copying  → Done
//!                                     → Decoding → Resizing → Encoding → Done
//!            ↘ Failed (at any stage, terminal for that item only)
//! ```
//!
//! Item failures are caught here, reported with the offending path and the
//! stage they happened in, and never abort the batch. Only setup failures
//! (invalid resize mode, unreadable input path, an output root that would
//! overwrite the input) make [`process`] return `Err`, and those happen
//! before anything is written.
//!
//! ## Parallel Processing
//!
//! Items are independent, so they are fanned out with
//! [rayon](https://docs.rs/rayon) over the pool configured in `main`. The only
//! shared resource is the output tree; directory creation is idempotent and
//! every worker writes a destination unique to its item.

use crate::imaging::{
    BackendError, ImageBackend, OutputFormat, ResizeMode, RustBackend, ShrinkConfig, ShrinkError,
    ShrinkOutcome, SizeError, shrink_picture,
};
use crate::mirror;
use crate::scan::{self, Route, ScanError, SourceFile};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Size(#[from] SizeError),
    #[error(transparent)]
    Shrink(#[from] ShrinkError),
    #[error("Unreadable directory entry: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{destination} is already produced from {first}")]
    DestinationConflict { destination: PathBuf, first: PathBuf },
}

/// Where in the per-item state machine a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovering,
    Classifying,
    /// Creating the destination directory.
    Preparing,
    Copying,
    Decoding,
    Resizing,
    Encoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovering => "discovering",
            Stage::Classifying => "classifying",
            Stage::Preparing => "preparing",
            Stage::Copying => "copying",
            Stage::Decoding => "decoding",
            Stage::Resizing => "resizing",
            Stage::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

fn shrink_stage(err: &ShrinkError) -> Stage {
    match err {
        ShrinkError::Backend(BackendError::Io(_) | BackendError::Decode(_)) => Stage::Decoding,
        ShrinkError::Size(_) => Stage::Resizing,
        ShrinkError::Backend(BackendError::Encode(_)) => Stage::Encoding,
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// File or directory given on the command line.
    pub input: PathBuf,
    /// Root of the mirrored output tree.
    pub output_root: PathBuf,
    pub shrink: ShrinkConfig,
}

/// How one item ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Resized(ShrinkOutcome),
    Copied { bytes: u64 },
    Failed { stage: Stage, error: String },
}

impl ItemOutcome {
    fn failed(stage: Stage, error: ProcessError) -> Self {
        ItemOutcome::Failed {
            stage,
            error: error.to_string(),
        }
    }
}

/// Report for one processed (or failed) path.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub source: PathBuf,
    /// Absent when the item failed before a destination was known.
    pub destination: Option<PathBuf>,
    pub outcome: ItemOutcome,
}

/// Progress events for the console printer.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        input_root: PathBuf,
        output_root: PathBuf,
        mode: ResizeMode,
        format: OutputFormat,
        files: usize,
        pictures: usize,
    },
    Item(ItemReport),
}

/// Per-run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub resized: usize,
    pub copied: usize,
    pub failed: usize,
}

impl ProcessSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Resized(_) => self.resized += 1,
            ItemOutcome::Copied { .. } => self.copied += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.resized + self.copied + self.failed
    }
}

impl fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} resized, {} copied, {} failed",
            self.resized, self.copied, self.failed
        )
    }
}

/// Result of a completed run: one report per path, sorted by source.
#[derive(Debug)]
pub struct ProcessResult {
    pub reports: Vec<ItemReport>,
    pub summary: ProcessSummary,
}

impl ProcessResult {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

/// A file with its destination decided.
#[derive(Debug)]
struct PlannedItem {
    file: SourceFile,
    destination: PathBuf,
}

/// Compute destinations and reject files whose destination is already taken.
///
/// Files are considered in scan order, so the first claimant wins.
fn plan(
    files: Vec<SourceFile>,
    input_root: &Path,
    output_root: &Path,
    format: OutputFormat,
) -> (Vec<PlannedItem>, Vec<ItemReport>) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut planned = Vec::new();
    let mut rejected = Vec::new();

    for file in files {
        let destination = mirror::destination(&file, input_root, output_root, format);
        if let Some(first) = claimed.get(&destination) {
            let error = ProcessError::DestinationConflict {
                destination: destination.clone(),
                first: first.clone(),
            };
            rejected.push(ItemReport {
                source: file.path,
                destination: Some(destination),
                outcome: ItemOutcome::failed(Stage::Classifying, error),
            });
            continue;
        }
        claimed.insert(destination.clone(), file.path.clone());
        planned.push(PlannedItem { file, destination });
    }

    (planned, rejected)
}

fn process_item(
    backend: &impl ImageBackend,
    item: &PlannedItem,
    config: &ShrinkConfig,
) -> ItemOutcome {
    let source = &item.file.path;
    let destination = &item.destination;

    if let Err(e) = mirror::ensure_parent(destination) {
        return ItemOutcome::failed(Stage::Preparing, e.into());
    }

    match item.file.route {
        Route::PassThrough => match mirror::copy_through(source, destination) {
            Ok(bytes) => ItemOutcome::Copied { bytes },
            Err(e) => ItemOutcome::failed(Stage::Copying, e.into()),
        },
        Route::Resizable => match shrink_picture(backend, source, destination, config) {
            Ok(outcome) => ItemOutcome::Resized(outcome),
            Err(e) => ItemOutcome::failed(shrink_stage(&e), e.into()),
        },
    }
}

fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A closed printer must not stop the run.
        let _ = tx.send(event);
    }
}

/// Run the pipeline with the production backend.
pub fn process(
    config: &RunConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, config, events)
}

/// Run the pipeline with a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    config: &RunConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    config.shrink.mode.validate()?;

    let scan = scan::scan(&config.input, &config.output_root)?;
    let events = events.as_ref();

    emit(
        events,
        ProcessEvent::Started {
            input_root: scan.input_root.clone(),
            output_root: config.output_root.clone(),
            mode: config.shrink.mode,
            format: config.shrink.format,
            files: scan.files.len(),
            pictures: scan.resizable_count(),
        },
    );

    let mut reports: Vec<ItemReport> = scan
        .failures
        .into_iter()
        .map(|failure| ItemReport {
            source: failure.path,
            destination: None,
            outcome: ItemOutcome::failed(Stage::Discovering, failure.error.into()),
        })
        .collect();

    let (planned, rejected) = plan(
        scan.files,
        &scan.input_root,
        &config.output_root,
        config.shrink.format,
    );
    reports.extend(rejected);
    for report in &reports {
        emit(events, ProcessEvent::Item(report.clone()));
    }

    let processed: Vec<ItemReport> = planned
        .par_iter()
        .map(|item| {
            let report = ItemReport {
                source: item.file.path.clone(),
                destination: Some(item.destination.clone()),
                outcome: process_item(backend, item, &config.shrink),
            };
            emit(events, ProcessEvent::Item(report.clone()));
            report
        })
        .collect();
    reports.extend(processed);
    reports.sort_by(|a, b| a.source.cmp(&b.source));

    let mut summary = ProcessSummary::default();
    for report in &reports {
        summary.record(&report.outcome);
    }

    Ok(ProcessResult { reports, summary })
}
