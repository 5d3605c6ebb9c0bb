//! Responsive WebP generation.
//!
//! This is the build hook. [`run`] takes an explicit, already-validated
//! [`WebpConfig`], walks the source tree and, for every source image, writes
//! the WebP outputs that are missing or stale.
//!
//! ## Per-image decision
//!
//! ```text
//! identify (header only)
//!   → plan targets: original (unless WebP source) + each width ≤ natural width
//!   → staleness: output missing, or output mtime < source mtime
//!   → nothing stale? done, the source is never decoded
//!   → decode once, then resize + encode + atomic write per stale output
//! ```
//!
//! ## Failure policy
//!
//! A missing or unreadable source root is fatal. Anything that goes wrong
//! with one image (bad header, corrupt data, encode or write failure) is
//! logged and recorded in the [`RunReport`]; that image's remaining outputs
//! are abandoned and the walk moves on. Nothing is retried: a failed output
//! stays missing or stale, so the next build tries again.

use crate::config::{ConfigError, WebpConfig};
use crate::imaging::{
    BackendError, ImageBackend, Method, Quality, VariantParams, WebpBackend,
    calculate_target_sizes,
};
use crate::naming::{TargetWidth, output_path};
use crate::scan::{self, ScanError, SkipReason, Skipped, SourceImage};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// State of one output after planning (and, for a real run, rendering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    /// Written during this run.
    Encoded,
    /// Existing output is at least as new as the source.
    UpToDate,
    /// Missing or older than the source; would be written (dry run only).
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub target: TargetWidth,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub status: OutputStatus,
}

/// What happened to one source image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub path: PathBuf,
    pub relative: PathBuf,
    /// Natural `(width, height)`, if the header could be read.
    pub dimensions: Option<(u32, u32)>,
    /// Outputs in plan order. On failure, only those settled before the error.
    pub outputs: Vec<OutputRecord>,
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: &SourceImage) -> Self {
        Self {
            path: source.path.clone(),
            relative: source.relative.clone(),
            dimensions: None,
            outputs: Vec::new(),
            error: None,
        }
    }

    fn count(&self, status: OutputStatus) -> usize {
        self.outputs.iter().filter(|o| o.status == status).count()
    }
}

/// Result of one generator run (or dry run).
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    pub skipped: Vec<Skipped>,
    /// Files ignored for their extension.
    pub ignored: usize,
}

impl RunReport {
    pub fn encoded(&self) -> usize {
        self.sources
            .iter()
            .map(|s| s.count(OutputStatus::Encoded))
            .sum()
    }

    pub fn up_to_date(&self) -> usize {
        self.sources
            .iter()
            .map(|s| s.count(OutputStatus::UpToDate))
            .sum()
    }

    pub fn stale(&self) -> usize {
        self.sources.iter().map(|s| s.count(OutputStatus::Stale)).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().filter(|s| s.error.is_some()).count()
    }

    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}

/// One output the planner wants to exist.
#[derive(Debug, Clone, PartialEq)]
struct PlannedOutput {
    target: TargetWidth,
    path: PathBuf,
    width: u32,
    height: u32,
    stale: bool,
}

impl PlannedOutput {
    fn record(&self, status: OutputStatus) -> OutputRecord {
        OutputRecord {
            target: self.target,
            path: self.path.clone(),
            width: self.width,
            height: self.height,
            status,
        }
    }
}

/// Whether `output` exists and is at least as new as the source.
pub fn is_up_to_date(output: &Path, source_modified: SystemTime) -> bool {
    std::fs::metadata(output)
        .and_then(|m| m.modified())
        .is_ok_and(|t| t >= source_modified)
}

/// Read the source header and work out every output it should have.
fn plan_source<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    config: &WebpConfig,
) -> Result<((u32, u32), Vec<PlannedOutput>), BackendError> {
    let dims = backend.identify(&source.path)?;
    let natural = (dims.width, dims.height);
    let include_original = config.process_original && !source.is_webp;

    let planned = calculate_target_sizes(natural, &config.sizes, include_original)
        .into_iter()
        .map(|size| {
            let path = output_path(
                &source.path,
                &config.source_dir,
                config.output_dir.as_deref(),
                size.target,
            );
            let stale = !is_up_to_date(&path, source.modified);
            PlannedOutput {
                target: size.target,
                path,
                width: size.width,
                height: size.height,
                stale,
            }
        })
        .collect();

    Ok((natural, planned))
}

/// Decode the source once and write every stale output.
///
/// Settled outputs are pushed to `records` as they complete, so a failure
/// part-way still reports what was written.
fn render_source<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    planned: &[PlannedOutput],
    config: &WebpConfig,
    records: &mut Vec<OutputRecord>,
) -> Result<(), BackendError> {
    if !planned.iter().any(|p| p.stale) {
        for output in planned {
            debug!(output = %output.path.display(), "up to date");
            records.push(output.record(OutputStatus::UpToDate));
        }
        return Ok(());
    }

    let image = backend.decode(&source.path)?;
    let quality = Quality::new(config.quality);
    let method = Method::new(config.method);

    for output in planned {
        if !output.stale {
            debug!(output = %output.path.display(), "up to date");
            records.push(output.record(OutputStatus::UpToDate));
            continue;
        }
        backend.write_variant(
            &image,
            &VariantParams {
                output: output.path.clone(),
                width: output.width,
                height: output.height,
                quality,
                method,
                not_before: Some(source.modified),
            },
        )?;
        info!(
            source = %source.relative.display(),
            output = %output.path.display(),
            size = %output.target,
            "encoded"
        );
        records.push(output.record(OutputStatus::Encoded));
    }
    Ok(())
}

fn process_source<B: ImageBackend>(
    backend: &B,
    source: &SourceImage,
    config: &WebpConfig,
) -> SourceReport {
    let mut report = SourceReport::new(source);
    let result = plan_source(backend, source, config).and_then(|(natural, planned)| {
        report.dimensions = Some(natural);
        render_source(backend, source, &planned, config, &mut report.outputs)
    });
    if let Err(err) = result {
        warn!(source = %source.path.display(), error = %err, "failed to process image");
        report.error = Some(err.to_string());
    }
    report
}

/// Pairs of sources whose outputs land on the same paths, e.g. `photo.jpg`
/// and `photo.png` in one directory. Each pair is `(first, later)` in walk
/// order; the later source's staleness is judged against the first's outputs.
fn shared_outputs(sources: &[SourceImage], config: &WebpConfig) -> Vec<(PathBuf, PathBuf)> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut shared = Vec::new();
    for source in sources {
        let key = output_path(
            &source.path,
            &config.source_dir,
            config.output_dir.as_deref(),
            TargetWidth::Original,
        );
        match claimed.get(&key) {
            Some(first) => shared.push((first.to_path_buf(), source.path.clone())),
            None => {
                claimed.insert(key, &source.path);
            }
        }
    }
    shared
}

fn warn_shared_outputs(sources: &[SourceImage], config: &WebpConfig) {
    for (first, later) in shared_outputs(sources, config) {
        warn!(
            first = %first.display(),
            later = %later.display(),
            "sources write the same output files"
        );
    }
}

/// Build hook entry point: generate all missing or stale WebP outputs.
pub fn run(config: &WebpConfig) -> Result<RunReport, ProcessError> {
    run_with_backend(&WebpBackend::new(), config)
}

/// [`run`] with an explicit backend (allows testing with a mock).
pub fn run_with_backend<B: ImageBackend>(
    backend: &B,
    config: &WebpConfig,
) -> Result<RunReport, ProcessError> {
    config.validate()?;
    info!(source_dir = %config.source_dir.display(), "processing images");

    let scanned = scan::scan(config)?;
    warn_shared_outputs(&scanned.sources, config);
    let sources = scanned
        .sources
        .iter()
        .map(|source| process_source(backend, source, config))
        .collect();

    let report = RunReport {
        sources,
        skipped: scanned.skipped,
        ignored: scanned.ignored,
    };
    info!(
        "Processed {} image variants from {} source images ({} up to date, {} failed)",
        report.encoded(),
        report.sources.len(),
        report.up_to_date(),
        report.failed()
    );
    Ok(report)
}

/// Dry run: report which outputs are up to date and which would be written.
pub fn plan(config: &WebpConfig) -> Result<RunReport, ProcessError> {
    plan_with_backend(&WebpBackend::new(), config)
}

/// [`plan`] with an explicit backend. Only `identify` is called.
pub fn plan_with_backend<B: ImageBackend>(
    backend: &B,
    config: &WebpConfig,
) -> Result<RunReport, ProcessError> {
    config.validate()?;
    let scanned = scan::scan(config)?;
    warn_shared_outputs(&scanned.sources, config);

    let sources = scanned
        .sources
        .iter()
        .map(|source| {
            let mut report = SourceReport::new(source);
            match plan_source(backend, source, config) {
                Ok((natural, planned)) => {
                    report.dimensions = Some(natural);
                    report.outputs = planned
                        .iter()
                        .map(|p| {
                            p.record(if p.stale {
                                OutputStatus::Stale
                            } else {
                                OutputStatus::UpToDate
                            })
                        })
                        .collect();
                }
                Err(err) => report.error = Some(err.to_string()),
            }
            report
        })
        .collect();

    Ok(RunReport {
        sources,
        skipped: scanned.skipped,
        ignored: scanned.ignored,
    })
}
