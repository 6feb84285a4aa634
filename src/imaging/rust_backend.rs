//! Pure Rust backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::load_from_memory` |
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Resize | `image::imageops::resize` with `Lanczos3` |
//! | Blur | `image::imageops::blur` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at quality 95 |
//! | Atomic write | `tempfile::NamedTempFile::persist` |

use super::backend::{Dimensions, EngineError, ImageBackend};
use super::calculations::Strategy;
use super::engine;
use super::params::TargetSpec;
use image::ImageReader;
use std::path::Path;

/// In-process backend running the [`engine`].
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, EngineError> {
        let origin = path.display().to_string();
        let (width, height) = ImageReader::open(path)
            .map_err(|e| EngineError::decode(&origin, e))?
            .with_guessed_format()
            .map_err(|e| EngineError::decode(&origin, e))?
            .into_dimensions()
            .map_err(|e| EngineError::decode(&origin, e))?;
        Ok(Dimensions { width, height })
    }

    fn normalize(
        &self,
        source: &Path,
        target: TargetSpec,
        dest: &Path,
    ) -> Result<Strategy, EngineError> {
        engine::normalize(source, target, dest)
    }
}
