//! Shared test utilities: synthetic images and timestamp control.

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::SystemTime;

/// Write a small valid JPEG with a gradient, so encoders have real content.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let writer = BufWriter::new(File::create(path).unwrap());
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a small RGBA PNG with a transparent left half.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        image::Rgba([200, (y % 256) as u8, 40, alpha])
    });
    let writer = BufWriter::new(File::create(path).unwrap());
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
}

/// Force a file's modification time.
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}
