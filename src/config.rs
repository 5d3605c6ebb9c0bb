//! WebP generation settings.
//!
//! Settings live in the `[webp]` table of the host site's `config.toml`.
//! Everything is optional; a missing file or a missing table means stock
//! defaults. Values are validated once, when the config is loaded, and an
//! out-of-range value aborts the build before any image is touched.
//!
//! ## Configuration Options
//!
//! ```toml
//! [webp]
//! source_dir = "static/images"     # Tree to scan for source images
//! sizes = [300, 600, 1200]         # Responsive widths in pixels
//! quality = 85                     # WebP quality (0-100)
//! method = 6                       # WebP compression effort (0-6)
//! extensions = [".jpg", ".jpeg", ".png", ".webp"]
//! skip_dirs = ["thumbnails"]       # Directory names excluded at any depth
//! process_original = true          # Also emit a full-size photo.webp
//! # output_dir = "output/images"   # Mirror outputs here instead of in place
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Host settings file. Only the `[webp]` table belongs to us; other tables
/// are the host framework's business and are ignored.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    webp: WebpConfig,
}

/// Responsive WebP generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    /// Root of the tree scanned for source images.
    pub source_dir: PathBuf,
    /// Target widths in pixels. Ascending by convention, not enforced.
    pub sizes: Vec<u32>,
    /// WebP quality (0 = worst, 100 = best).
    pub quality: u32,
    /// WebP compression effort (0 = fastest, 6 = smallest output).
    pub method: u32,
    /// Accepted source extensions. Leading dot optional, case-insensitive.
    pub extensions: Vec<String>,
    /// Directory names excluded wherever they appear below the source root.
    pub skip_dirs: Vec<String>,
    /// Also write a full-size `name.webp` next to the resized variants.
    pub process_original: bool,
    /// When set, outputs are written under this directory, mirroring each
    /// source's relative path, instead of next to the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("static/images"),
            sizes: vec![300, 600, 1200],
            quality: 85,
            method: 6,
            extensions: [".jpg", ".jpeg", ".png", ".webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_dirs: vec!["thumbnails".to_string()],
            process_original: true,
            output_dir: None,
        }
    }
}

impl WebpConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality > 100 {
            return Err(ConfigError::Validation("webp.quality must be 0-100".into()));
        }
        if self.method > 6 {
            return Err(ConfigError::Validation("webp.method must be 0-6".into()));
        }
        if self.sizes.contains(&0) {
            return Err(ConfigError::Validation(
                "webp.sizes values must be non-zero".into(),
            ));
        }
        if self.extensions.iter().any(|e| e.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Validation(
                "webp.extensions must not contain empty entries".into(),
            ));
        }
        Ok(())
    }

    /// Whether `path` carries one of the accepted source extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Whether a directory name is on the skip list.
    pub fn is_skipped_dir(&self, name: &str) -> bool {
        self.skip_dirs.iter().any(|d| d == name)
    }

    /// Resolve relative `source_dir` and `output_dir` against `base`
    /// (normally the directory holding the settings file).
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.source_dir.is_relative() {
            self.source_dir = base.join(&self.source_dir);
        }
        if let Some(out) = self.output_dir.take() {
            self.output_dir = Some(if out.is_relative() { base.join(out) } else { out });
        }
        self
    }
}

/// Parse a settings document and validate its `[webp]` table.
pub fn parse_config(content: &str) -> Result<WebpConfig, ConfigError> {
    let settings: SettingsFile = toml::from_str(content)?;
    settings.webp.validate()?;
    Ok(settings.webp)
}

/// Load the `[webp]` table from a settings file.
///
/// A missing file yields stock defaults. Relative paths in the table are
/// resolved against the settings file's directory.
pub fn load_config(path: &Path) -> Result<WebpConfig, ConfigError> {
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if !path.exists() {
        let config = WebpConfig::default();
        config.validate()?;
        return Ok(config.resolve_paths(&base));
    }
    let content = fs::read_to_string(path)?;
    Ok(parse_config(&content)?.resolve_paths(&base))
}

/// Returns a fully-commented stock `[webp]` table with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Responsive WebP settings
# =========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

[webp]
# Directory scanned (recursively) for source images.
source_dir = "static/images"

# Target widths in pixels. Widths larger than a source image are skipped;
# images are never upscaled.
sizes = [300, 600, 1200]

# WebP encoding quality (0 = worst, 100 = best).
quality = 85

# WebP compression effort (0 = fastest, 6 = slowest / smallest).
method = 6

# Source file extensions to convert (case-insensitive).
extensions = [".jpg", ".jpeg", ".png", ".webp"]

# Directory names skipped wherever they appear in the tree.
skip_dirs = ["thumbnails"]

# Also emit a full-size name.webp alongside the name-<width>.webp variants.
process_original = true

# Write outputs into a mirrored tree instead of next to each source.
# output_dir = "output/static/images"
"##
}
