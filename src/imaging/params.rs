//! Parameter types for image operations.
//!
//! These structs describe *what* to write, not *how*. They are the interface
//! between [`process`](crate::process) (which decides which variants are
//! stale) and the [`backend`](super::backend) (which does the pixel work),
//! so the backend can be swapped for a recording mock in tests.

use std::path::PathBuf;
use std::time::SystemTime;

/// Lossy WebP quality (0-100). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// libwebp compression method (0 = fastest, 6 = best compression).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Method(u8);

impl Method {
    pub fn new(value: u32) -> Self {
        Self(value.min(6) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Self(6)
    }
}

/// One WebP file to write from an already-decoded source.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantParams {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub method: Method,
    /// The written file's mtime must not be earlier than this (the source's
    /// mtime), otherwise the next run would see it as stale.
    pub not_before: Option<SystemTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 0);
        assert_eq!(Quality::new(85).value(), 85);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn method_clamps_to_valid_range() {
        assert_eq!(Method::new(0).value(), 0);
        assert_eq!(Method::new(4).value(), 4);
        assert_eq!(Method::new(9).value(), 6);
    }

    #[test]
    fn defaults_match_stock_config() {
        assert_eq!(Quality::default().value(), 85);
        assert_eq!(Method::default().value(), 6);
    }
}
