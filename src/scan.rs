//! Source tree walk.
//!
//! Walks the configured source root and decides, for every regular file,
//! whether it is a source image. Rejections, in order:
//!
//! 1. anything below a directory named in `skip_dirs` (pruned, never entered)
//! 2. extensions outside `extensions`
//! 3. names that follow our own output convention for a configured width
//!    (`photo-300.webp`)
//! 4. a `photo.webp` sitting next to `photo.jpg` / `photo.png`: that is the
//!    full-size output we wrote for the sibling, not a source of its own
//! 5. a `photo-1600.webp` whose `photo` sibling exists: an output left over
//!    from an earlier `sizes` setting
//!
//! ```text
//! static/images/
//! ├── photo.jpg            source
//! ├── photo.webp           generated (sibling photo.jpg exists)
//! ├── photo-300.webp       generated (width suffix)
//! ├── photo-1600.webp      generated (old width, sibling photo.jpg exists)
//! ├── hero-2.webp          source (no hero.* sibling)
//! ├── banner.webp          source (resized variants only)
//! ├── notes.txt            ignored (extension)
//! └── thumbnails/
//!     └── photo.jpg        ignored (skipped directory)
//! ```
//!
//! Only the root is mandatory. An unreadable subdirectory is logged and
//! recorded, and the walk carries on.

use crate::config::WebpConfig;
use crate::naming::{file_stem, is_generated_variant, is_webp, split_width_suffix};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("source directory {} is not readable: {source}", .path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// A file accepted as a conversion source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub path: PathBuf,
    /// Path relative to the source root, for display.
    pub relative: PathBuf,
    pub modified: SystemTime,
    /// WebP sources never get an original-size output (it would be themselves).
    pub is_webp: bool,
}

/// Why a file (or directory) was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ExcludedDir,
    GeneratedVariant,
    GeneratedOriginal,
    Unreadable,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::ExcludedDir => "excluded directory",
            SkipReason::GeneratedVariant => "generated variant",
            SkipReason::GeneratedOriginal => "generated original",
            SkipReason::Unreadable => "unreadable",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Everything the walk found.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Accepted sources, in walk order (sorted by file name per directory).
    pub sources: Vec<SourceImage>,
    pub skipped: Vec<Skipped>,
    /// Files ignored because of their extension. Counted, not listed.
    pub ignored: usize,
}

/// Check the source root exists, is a directory and can be listed.
pub fn check_source_root(root: &Path) -> Result<(), ScanError> {
    let meta = fs::metadata(root).map_err(|source| ScanError::SourceDir {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root).map_err(|source| ScanError::SourceDir {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Walk `config.source_dir` and classify every file.
pub fn scan(config: &WebpConfig) -> Result<ScanResult, ScanError> {
    let root = config.source_dir.as_path();
    check_source_root(root)?;

    let mut result = ScanResult::default();
    let mut pruned = Vec::new();
    let mut candidates = Vec::new();

    // Compared canonically, so `./images` and `images/out` still match up.
    let output_root = config
        .output_dir
        .as_deref()
        .and_then(|out| fs::canonicalize(out).ok());

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let skipped = entry
                .file_name()
                .to_str()
                .is_some_and(|name| config.is_skipped_dir(name))
                || output_root.as_deref().is_some_and(|out| {
                    fs::canonicalize(entry.path()).is_ok_and(|dir| dir == out)
                });
            if skipped {
                pruned.push(entry.path().to_path_buf());
            }
            !skipped
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                result.skipped.push(Skipped {
                    path,
                    reason: SkipReason::Unreadable,
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !config.accepts_extension(path) {
            result.ignored += 1;
            continue;
        }
        if is_generated_variant(path, &config.sizes) {
            debug!(path = %path.display(), "skipping generated variant");
            result.skipped.push(Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::GeneratedVariant,
            });
            continue;
        }
        let modified = match entry.metadata().map_err(std::io::Error::from).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read modification time");
                result.skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: SkipReason::Unreadable,
                });
                continue;
            }
        };
        candidates.push(SourceImage {
            path: path.to_path_buf(),
            relative: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
            modified,
            is_webp: is_webp(path),
        });
    }

    for dir in pruned {
        debug!(path = %dir.display(), "skipping excluded directory");
        result.skipped.push(Skipped {
            path: dir,
            reason: SkipReason::ExcludedDir,
        });
    }

    // (directory, stem) of every non-WebP source: a WebP with the same key
    // is the full-size output we produced for it.
    let raster_stems: HashSet<(PathBuf, String)> = candidates
        .iter()
        .filter(|s| !s.is_webp)
        .map(|s| sibling_key(&s.path))
        .collect();
    let all_stems: HashSet<(PathBuf, String)> =
        candidates.iter().map(|s| sibling_key(&s.path)).collect();

    for source in candidates {
        if source.is_webp && raster_stems.contains(&sibling_key(&source.path)) {
            debug!(path = %source.path.display(), "skipping generated original");
            result.skipped.push(Skipped {
                path: source.path,
                reason: SkipReason::GeneratedOriginal,
            });
        } else if source.is_webp && is_leftover_variant(&source.path, &all_stems) {
            info!(
                path = %source.path.display(),
                "skipping output of an unconfigured width"
            );
            result.skipped.push(Skipped {
                path: source.path,
                reason: SkipReason::GeneratedVariant,
            });
        } else {
            result.sources.push(source);
        }
    }

    Ok(result)
}

/// `photo-1600.webp` next to any `photo.*` source.
fn is_leftover_variant(path: &Path, stems: &HashSet<(PathBuf, String)>) -> bool {
    let stem = file_stem(path);
    let Some((base, _)) = split_width_suffix(&stem) else {
        return false;
    };
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    stems.contains(&(dir, base.to_string()))
}

fn sibling_key(path: &Path) -> (PathBuf, String) {
    (
        path.parent().map(Path::to_path_buf).unwrap_or_default(),
        file_stem(path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn config_for(root: &Path) -> WebpConfig {
        WebpConfig {
            source_dir: root.to_path_buf(),
            ..WebpConfig::default()
        }
    }

    fn source_names(result: &ScanResult) -> Vec<String> {
        result
            .sources
            .iter()
            .map(|s| s.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn reason_of(result: &ScanResult, rel: &str) -> Option<SkipReason> {
        result
            .skipped
            .iter()
            .find(|s| s.path.ends_with(rel))
            .map(|s| s.reason)
    }

    #[test]
    fn finds_sources_recursively_in_name_order() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.png");
        touch(tmp.path(), "a.jpg");
        touch(tmp.path(), "travel/japan/tokyo.jpeg");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(
            source_names(&result),
            vec!["a.jpg", "b.png", "travel/japan/tokyo.jpeg"]
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "LOUD.JPG");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["LOUD.JPG"]);
    }

    #[test]
    fn other_extensions_are_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "anim.gif");
        touch(tmp.path(), "photo.jpg");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
        assert_eq!(result.ignored, 2);
    }

    #[test]
    fn excluded_dirs_pruned_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "thumbnails/photo.jpg");
        touch(tmp.path(), "gallery/thumbnails/deep/photo.jpg");
        touch(tmp.path(), "gallery/photo.jpg");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["gallery/photo.jpg"]);
        assert_eq!(reason_of(&result, "thumbnails"), Some(SkipReason::ExcludedDir));
    }

    #[test]
    fn root_named_like_excluded_dir_is_still_walked() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("thumbnails");
        touch(&root, "photo.jpg");

        let result = scan(&config_for(&root)).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
    }

    #[test]
    fn file_named_like_excluded_dir_is_not_excluded() {
        let tmp = TempDir::new().unwrap();
        let config = WebpConfig {
            skip_dirs: vec!["cover.jpg".into()],
            ..config_for(tmp.path())
        };
        touch(tmp.path(), "cover.jpg");

        let result = scan(&config).unwrap();
        assert_eq!(source_names(&result), vec!["cover.jpg"]);
    }

    #[test]
    fn generated_variants_are_not_sources() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        touch(tmp.path(), "photo-300.webp");
        touch(tmp.path(), "photo-1200.webp");
        touch(tmp.path(), "skip-300.jpg");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
        assert_eq!(
            reason_of(&result, "photo-300.webp"),
            Some(SkipReason::GeneratedVariant)
        );
        assert_eq!(
            reason_of(&result, "skip-300.jpg"),
            Some(SkipReason::GeneratedVariant)
        );
    }

    #[test]
    fn old_width_webp_with_sibling_is_generated() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        touch(tmp.path(), "photo-1600.webp");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
        assert_eq!(
            reason_of(&result, "photo-1600.webp"),
            Some(SkipReason::GeneratedVariant)
        );
    }

    #[test]
    fn numbered_webp_without_sibling_is_a_source() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "hero-2.webp");
        touch(tmp.path(), "shot-2024.webp");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["hero-2.webp", "shot-2024.webp"]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn webp_next_to_raster_sibling_is_generated_original() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        touch(tmp.path(), "photo.webp");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
        assert_eq!(
            reason_of(&result, "photo.webp"),
            Some(SkipReason::GeneratedOriginal)
        );
    }

    #[test]
    fn standalone_webp_is_a_source() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "banner.webp");
        touch(tmp.path(), "other/photo.jpg");

        let result = scan(&config_for(tmp.path())).unwrap();
        assert_eq!(source_names(&result), vec!["banner.webp", "other/photo.jpg"]);
        assert!(result.sources[0].is_webp);
        assert!(!result.sources[1].is_webp);
    }

    #[test]
    fn output_dir_inside_source_is_not_walked() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        touch(tmp.path(), "out/photo.webp");
        let config = WebpConfig {
            output_dir: Some(tmp.path().join("out")),
            ..config_for(tmp.path())
        };

        let result = scan(&config).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
    }

    #[test]
    fn output_dir_spelled_differently_is_still_not_walked() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("site")).unwrap();
        touch(tmp.path(), "images/photo.jpg");
        touch(tmp.path(), "images/out/photo.webp");
        touch(tmp.path(), "images/out/photo-300.webp");
        let config = WebpConfig {
            source_dir: tmp.path().join("site/../images/."),
            output_dir: Some(tmp.path().join("images/out")),
            ..WebpConfig::default()
        };

        let result = scan(&config).unwrap();
        assert_eq!(source_names(&result), vec!["photo.jpg"]);
        assert_eq!(reason_of(&result, "out"), Some(SkipReason::ExcludedDir));
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&config_for(&tmp.path().join("nope")));
        assert!(matches!(result, Err(ScanError::SourceDir { .. })));
    }

    #[test]
    fn file_as_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "photo.jpg");
        let result = scan(&config_for(&tmp.path().join("photo.jpg")));
        assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn empty_root_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&config_for(tmp.path())).unwrap();
        assert!(result.sources.is_empty());
        assert!(result.skipped.is_empty());
    }
}
