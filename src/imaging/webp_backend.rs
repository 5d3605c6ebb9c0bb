//! Production backend: `image` for decode and resampling, libwebp for encode.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → WebP | `webp::Encoder::encode_advanced` (quality + method) |
//! | Atomic write | `tempfile::NamedTempFile::persist` in the target directory |
//!
//! The `image` crate's own WebP encoder is lossless-only, which is why the
//! encode step goes through libwebp.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::VariantParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

pub struct WebpBackend;

impl WebpBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WebpBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    // Sniff the content rather than trusting the extension.
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Resample to the exact target size; a same-size target is passed through.
fn resize_for(image: &DynamicImage, width: u32, height: u32) -> Option<DynamicImage> {
    if image.width() == width && image.height() == height {
        None
    } else {
        Some(image.resize_exact(width, height, FilterType::Lanczos3))
    }
}

/// Encode with libwebp. Only 8-bit RGB and RGBA layouts are accepted by the
/// encoder, so everything else is converted first.
pub(crate) fn encode_webp(
    image: &DynamicImage,
    quality: u8,
    method: u8,
) -> Result<Vec<u8>, BackendError> {
    let converted = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let encoder = webp::Encoder::from_image(&converted).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to create WebP encoder: {e}"))
    })?;

    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::ProcessingFailed("libwebp config init failed".into()))?;
    config.quality = quality as f32;
    config.method = method as i32;

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
    Ok(encoded.to_vec())
}

/// Write `bytes` to `path` via a temp file in the same directory, so a
/// crashed build never leaves a truncated `.webp` that looks up to date.
fn write_atomic(path: &Path, bytes: &[u8], not_before: Option<SystemTime>) -> Result<(), BackendError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".webp-sizes-")
        .suffix(".part")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    // A source dated in the future would otherwise leave the output
    // permanently stale.
    if let Some(source_mtime) = not_before {
        let written = tmp.as_file().metadata()?.modified()?;
        if written < source_mtime {
            tmp.as_file().set_modified(source_mtime)?;
        }
    }

    tmp.persist(path).map_err(|e| BackendError::Io(e.error))?;
    Ok(())
}

impl ImageBackend for WebpBackend {
    type Decoded = DynamicImage;

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {e}"))
        })?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        open_reader(path)?.decode().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {e}", path.display()))
        })
    }

    fn write_variant(
        &self,
        image: &DynamicImage,
        params: &VariantParams,
    ) -> Result<(), BackendError> {
        let resized = resize_for(image, params.width, params.height);
        let bytes = encode_webp(
            resized.as_ref().unwrap_or(image),
            params.quality.value(),
            params.method.value(),
        )?;
        write_atomic(&params.output, &bytes, params.not_before)
    }
}
