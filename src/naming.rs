//! Output naming convention.
//!
//! Every output sits in the same directory as its source (or the mirrored
//! directory under `output_dir`) and shares its stem:
//!
//! - `photo.jpg` at original size → `photo.webp`
//! - `photo.jpg` at 600px → `photo-600.webp`
//!
//! The same convention is used in reverse to recognise files we generated,
//! so a later walk never feeds them back in as fresh sources.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Target width of an output variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetWidth {
    /// Re-encode at the source's natural size. No suffix in the file name.
    Original,
    /// Resize to this many pixels wide. Suffixed `-{width}`.
    Pixels(u32),
}

impl std::fmt::Display for TargetWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetWidth::Original => f.write_str("original"),
            TargetWidth::Pixels(w) => write!(f, "{w}px"),
        }
    }
}

/// File name for an output variant of `stem`.
///
/// ```
/// # use webp_sizes::naming::{output_file_name, TargetWidth};
/// assert_eq!(output_file_name("photo", TargetWidth::Original), "photo.webp");
/// assert_eq!(output_file_name("photo", TargetWidth::Pixels(300)), "photo-300.webp");
/// ```
pub fn output_file_name(stem: &str, target: TargetWidth) -> String {
    match target {
        TargetWidth::Original => format!("{stem}.webp"),
        TargetWidth::Pixels(w) => format!("{stem}-{w}.webp"),
    }
}

/// Directory an output for `source` is written to.
///
/// With no `output_dir` this is the source's own directory. Otherwise the
/// source's directory relative to `source_root` is recreated under
/// `output_dir`.
pub fn output_dir_for(source: &Path, source_root: &Path, output_dir: Option<&Path>) -> PathBuf {
    let parent = source.parent().unwrap_or(Path::new(""));
    match output_dir {
        None => parent.to_path_buf(),
        Some(out) => match parent.strip_prefix(source_root) {
            Ok(rel) => out.join(rel),
            Err(_) => out.to_path_buf(),
        },
    }
}

/// Full output path for one variant of `source`.
pub fn output_path(
    source: &Path,
    source_root: &Path,
    output_dir: Option<&Path>,
    target: TargetWidth,
) -> PathBuf {
    let stem = file_stem(source);
    output_dir_for(source, source_root, output_dir).join(output_file_name(&stem, target))
}

/// Lossy UTF-8 file stem, empty if the path has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Split a trailing `-NNN` width suffix off a stem.
///
/// - `"photo-300"` → `Some(("photo", 300))`
/// - `"my-photo"` → `None`
/// - `"photo-"` → `None`
pub fn split_width_suffix(stem: &str) -> Option<(&str, u32)> {
    let (base, digits) = stem.rsplit_once('-')?;
    if base.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((base, digits.parse().ok()?))
}

/// The width from a trailing `-NNN` suffix, if any.
pub fn width_suffix(stem: &str) -> Option<u32> {
    split_width_suffix(stem).map(|(_, width)| width)
}

/// Whether a file is named like one of our resized outputs for a configured
/// width, whatever its extension.
///
/// Outputs left over from an earlier `sizes` setting can only be told apart
/// from genuine sources by looking at their siblings; [`scan`](crate::scan)
/// does that.
pub fn is_generated_variant(path: &Path, sizes: &[u32]) -> bool {
    width_suffix(&file_stem(path)).is_some_and(|width| sizes.contains(&width))
}

/// Whether the path has a `.webp` extension (case-insensitive).
pub fn is_webp(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("webp"))
}
