//! # webp-sizes
//!
//! A build-time generator of responsive WebP images for static sites. Point it
//! at the site's image directory and every JPEG, PNG and WebP in the tree gets
//! a set of WebP siblings at fixed widths, ready for `srcset`.
//!
//! ```text
//! static/images/photo.jpg   (1800 × 1200)
//!   → photo.webp            1800 × 1200
//!   → photo-300.webp         300 × 200
//!   → photo-600.webp         600 × 400
//!   → photo-1200.webp       1200 × 800
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `[webp]` table loading, defaults, validation, stock config |
//! | [`naming`] | Output file naming and recognition of generated files |
//! | [`scan`] | Walks the source tree and classifies every file |
//! | [`process`] | The build hook: plans, checks staleness, and writes outputs |
//! | [`imaging`] | Backend trait, size calculations, and the libwebp backend |
//! | [`output`] | CLI formatting of run reports and plans |
//!
//! # Design Decisions
//!
//! ## Timestamps Are the Cache
//!
//! An output is up to date when it exists and is at least as new as its
//! source. There is no manifest to keep in sync and nothing to clean up: delete
//! an output and the next build recreates it, touch a source and all of its
//! outputs are rewritten. Written outputs get their mtime pinned to at least
//! the source's, so coarse filesystem clocks cannot make a fresh output look
//! stale.
//!
//! ## Decode Once, Only When Needed
//!
//! Every source is identified from its header first. Only if at least one
//! output is missing or stale is the image decoded, and then only once; each
//! variant is resized from that single decode. A fully up-to-date tree costs
//! one directory walk plus a header read per image.
//!
//! ## Outputs Never Become Inputs
//!
//! Generated files live beside their sources, so the walk recognises them by
//! name (`photo-300.webp`, or `photo.webp` next to `photo.jpg`) and skips
//! them. See [`naming::is_generated_variant`].
//!
//! ## Never Upscale
//!
//! A width larger than the source is skipped rather than produced. A 800px
//! image gets `-300` and `-600` variants and nothing else.
//!
//! ## One Bad File Never Fails the Build
//!
//! A corrupt or unreadable image is logged and recorded in the run report;
//! the rest of the tree is still processed. Only a broken configuration or a
//! missing source directory aborts the run.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
