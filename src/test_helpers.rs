//! Shared test utilities: synthetic source images written to disk.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let icon = write_png(&tmp.path().join("logo.png"), 800, 600);
//! ```

use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Deterministic RGB gradient, busy enough that blur visibly changes it.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Write a gradient PNG and return its path.
pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
    path.to_path_buf()
}
