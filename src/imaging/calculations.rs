//! Pure calculation functions for output dimensions.
//!
//! No I/O here: everything is testable without images on disk.

use crate::naming::TargetWidth;

/// Height that keeps the aspect ratio when `width × height` is scaled to
/// `target_width`. Rounded to the nearest pixel, never below 1.
///
/// ```
/// # use webp_sizes::imaging::scaled_height;
/// assert_eq!(scaled_height((1800, 1200), 300), 200);
/// assert_eq!(scaled_height((1000, 333), 300), 100); // 99.9 rounds up
/// ```
pub fn scaled_height(original: (u32, u32), target_width: u32) -> u32 {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return orig_h.max(1);
    }
    let h = (orig_h as f64 * target_width as f64 / orig_w as f64).round() as u32;
    h.max(1)
}

/// A single output size to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSize {
    pub target: TargetWidth,
    pub width: u32,
    pub height: u32,
}

/// Calculate which outputs to generate for an image and their dimensions.
///
/// The original-size entry comes first when `include_original` is set.
/// Configured widths keep their order; widths larger than the source are
/// dropped (no upscaling) and duplicates are collapsed.
pub fn calculate_target_sizes(
    original: (u32, u32),
    sizes: &[u32],
    include_original: bool,
) -> Vec<PlannedSize> {
    let (orig_w, orig_h) = original;
    let mut result = Vec::with_capacity(sizes.len() + 1);

    if include_original {
        result.push(PlannedSize {
            target: TargetWidth::Original,
            width: orig_w,
            height: orig_h,
        });
    }

    for &width in sizes {
        if width > orig_w {
            continue;
        }
        let target = TargetWidth::Pixels(width);
        if result.iter().any(|p| p.target == target) {
            continue;
        }
        result.push(PlannedSize {
            target,
            width,
            height: scaled_height(original, width),
        });
    }

    result
}
