//! Image processing — decode, resample, WebP encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `image` |
//! | **Encode → WebP** | libwebp via the `webp` crate |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing one output to write
//! - **Backend**: [`ImageBackend`] trait + [`WebpBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod webp_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{PlannedSize, calculate_target_sizes, scaled_height};
pub use params::{Method, Quality, VariantParams};
pub use webp_backend::WebpBackend;
