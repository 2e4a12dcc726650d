//! CLI output formatting for a shrink run.
//!
//! # Output Format
//!
//! ```text
//! ==> Shrinking photos (greater side 1800px, jpeg) → _resized_pictures
//!     12 files, 9 pictures
//! resized photos/2023/beach.JPG → _resized_pictures/2023/beach.jpg (4000x3000 → 1800x1350)
//! copied  photos/2023/notes.txt → _resized_pictures/2023/notes.txt
//! FAILED  photos/broken.jpg (decoding): Decode failed: ...
//! ==> 8 resized, 3 copied, 1 failed
//! Failures:
//!     photos/broken.jpg (decoding): Decode failed: ...
//! ```
//!
//! Item lines arrive in completion order, which varies between runs. The
//! closing failure list is sorted by path.
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{ItemOutcome, ItemReport, ProcessEvent, ProcessResult};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn failure_detail(source: &Path, stage: impl std::fmt::Display, error: &str) -> String {
    format!("{} ({}): {}", source.display(), stage, error)
}

/// Format one item report as a single line.
pub fn format_item(report: &ItemReport) -> String {
    let source = report.source.display();
    let destination = report
        .destination
        .as_deref()
        .map(|d| d.display().to_string())
        .unwrap_or_default();

    match &report.outcome {
        ItemOutcome::Resized(outcome) => format!(
            "resized {} → {} ({} → {})",
            source, destination, outcome.original, outcome.resized
        ),
        ItemOutcome::Copied { .. } => format!("copied  {} → {}", source, destination),
        ItemOutcome::Failed { stage, error } => {
            format!("FAILED  {}", failure_detail(&report.source, stage, error))
        }
    }
}

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started {
            input_root,
            output_root,
            mode,
            format,
            files,
            pictures,
        } => vec![
            format!(
                "==> Shrinking {} ({}, {}) → {}",
                input_root.display(),
                mode,
                format,
                output_root.display()
            ),
            format!("{}{} files, {} pictures", indent(1), files, pictures),
        ],
        ProcessEvent::Item(report) => vec![format_item(report)],
    }
}

pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-run totals, followed by every failure again.
pub fn format_summary(result: &ProcessResult) -> Vec<String> {
    let mut lines = vec![format!("==> {}", result.summary)];

    let failures: Vec<String> = result
        .reports
        .iter()
        .filter_map(|r| match &r.outcome {
            ItemOutcome::Failed { stage, error } => Some(format!(
                "{}{}",
                indent(1),
                failure_detail(&r.source, stage, error)
            )),
            _ => None,
        })
        .collect();

    if !failures.is_empty() {
        lines.push("Failures:".to_string());
        lines.extend(failures);
    }
    lines
}

pub fn print_summary(result: &ProcessResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}
