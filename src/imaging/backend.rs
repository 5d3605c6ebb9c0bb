//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait splits the work into three steps so the caller
//! controls when the expensive part happens:
//!
//! 1. `identify` — header-only dimension read, run for every candidate
//! 2. `decode` — full decode, run at most once per source and only when some
//!    output is actually stale
//! 3. `write_variant` — resize, encode and write one output from the decoded
//!    image
//!
//! The production implementation is
//! [`WebpBackend`](super::webp_backend::WebpBackend).

use super::params::VariantParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

pub trait ImageBackend {
    /// Decoded pixel data, held only while one source is being processed.
    type Decoded;

    /// Read image dimensions without decoding pixel data.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Fully decode the source image.
    fn decode(&self, path: &Path) -> Result<Self::Decoded, BackendError>;

    /// Resize (if needed), encode as WebP and atomically write one output.
    fn write_variant(
        &self,
        image: &Self::Decoded,
        params: &VariantParams,
    ) -> Result<(), BackendError>;
}
