//! CLI output formatting for run and check results.
//!
//! Output is **source-centric**: each source image leads with its positional
//! index, relative path and natural size; each output is an indented status
//! line underneath.
//!
//! ```text
//! 001 travel/photo.jpg (1800x1200)
//!     original: encoded → photo.webp
//!     300px: up to date
//!     600px: encoded → photo-600.webp
//! 002 bad.jpg
//!     Error: Processing failed: Failed to decode bad.jpg: ...
//!
//! Skipped: 1 excluded directory, 4 generated variants, 2 ignored files
//! Encoded 2 variants from 2 source images (1 up to date, 1 failed)
//! ```
//!
//! `format_*` functions are pure and return lines; `print_*` wrappers write
//! them to stdout.

use crate::process::{OutputRecord, OutputStatus, RunReport, SourceReport};
use crate::scan::SkipReason;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn source_header(index: usize, source: &SourceReport) -> String {
    let rel = source.relative.to_string_lossy().replace('\\', "/");
    match source.dimensions {
        Some((w, h)) => format!("{} {} ({}x{})", format_index(index), rel, w, h),
        None => format!("{} {}", format_index(index), rel),
    }
}

fn output_line(output: &OutputRecord) -> String {
    let name = output
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match output.status {
        OutputStatus::Encoded => format!("    {}: encoded → {}", output.target, name),
        OutputStatus::UpToDate => format!("    {}: up to date", output.target),
        OutputStatus::Stale => format!("    {}: would encode → {}", output.target, name),
    }
}

fn format_sources(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, source) in report.sources.iter().enumerate() {
        lines.push(source_header(i + 1, source));
        lines.extend(source.outputs.iter().map(output_line));
        if let Some(ref err) = source.error {
            lines.push(format!("    Error: {}", err));
        }
    }
    lines
}

/// One-line summary of skipped and ignored files, if there were any.
fn skipped_summary(report: &RunReport) -> Option<String> {
    let parts: Vec<String> = [
        (SkipReason::ExcludedDir, "excluded directory", "excluded directories"),
        (SkipReason::GeneratedVariant, "generated variant", "generated variants"),
        (SkipReason::GeneratedOriginal, "generated original", "generated originals"),
        (SkipReason::Unreadable, "unreadable entry", "unreadable entries"),
    ]
    .into_iter()
    .map(|(reason, one, many)| (report.skipped_for(reason), one, many))
    .filter(|(count, _, _)| *count > 0)
    .map(|(count, one, many)| plural(count, one, many))
    .chain((report.ignored > 0).then(|| plural(report.ignored, "ignored file", "ignored files")))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(format!("Skipped: {}", parts.join(", ")))
    }
}

/// Format the result of a generator run.
pub fn format_run_output(report: &RunReport) -> Vec<String> {
    let mut lines = format_sources(report);
    lines.push(String::new());
    lines.extend(skipped_summary(report));
    lines.push(format!(
        "Encoded {} from {} ({} up to date, {} failed)",
        plural(report.encoded(), "variant", "variants"),
        plural(report.sources.len(), "source image", "source images"),
        report.up_to_date(),
        report.failed()
    ));
    lines
}

/// Format a dry-run plan.
pub fn format_plan_output(report: &RunReport) -> Vec<String> {
    let mut lines = format_sources(report);
    lines.push(String::new());
    lines.extend(skipped_summary(report));
    lines.push(format!(
        "{} to encode, {} up to date, {} unreadable",
        plural(report.stale(), "variant", "variants"),
        report.up_to_date(),
        report.failed()
    ));
    lines
}

/// Print run output to stdout.
pub fn print_run_output(report: &RunReport) {
    for line in format_run_output(report) {
        println!("{}", line);
    }
}

/// Print plan output to stdout.
pub fn print_plan_output(report: &RunReport) {
    for line in format_plan_output(report) {
        println!("{}", line);
    }
}
