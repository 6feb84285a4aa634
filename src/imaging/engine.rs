//! The normalization pipeline.
//!
//! ```text
//! bytes ─► SourceImage ─► NormalizedImage ─► classify ─┬─► direct_fit ─┬─► JPEG ─► file
//!                                                      └─► composite ──┘
//! ```
//!
//! Each call is a pure function of its inputs. Nothing is cached or shared
//! between calls, so any number of them may run concurrently. A failure at
//! any stage ends that one call with an [`EngineError`].

use super::backend::EngineError;
use super::calculations::{Strategy, classify};
use super::composite::composite;
use super::direct_fit::direct_fit;
use super::encode::{encode_jpeg, write_atomic};
use super::params::{OUTPUT_QUALITY, TargetSpec};
use super::source::SourceImage;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// A finished canvas, before encoding.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub canvas: RgbImage,
    pub strategy: Strategy,
}

/// Encoded output bytes.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub strategy: Strategy,
}

/// Normalize colors, classify, and build the canvas.
pub fn render(source: SourceImage, target: TargetSpec) -> Result<Rendered, EngineError> {
    target.validate()?;
    let image = source.into_normalized();
    let strategy = classify(image.dimensions(), target.dimensions());
    debug!(source = ?image.dimensions(), %target, %strategy, "classified");

    let canvas = match strategy {
        Strategy::DirectFit => direct_fit(&image, target),
        Strategy::Composite => composite(&image, target),
    };
    Ok(Rendered { canvas, strategy })
}

/// Decode, render and encode an in-memory image.
///
/// `origin` identifies the source in error messages.
pub fn normalize_bytes(
    bytes: &[u8],
    origin: &str,
    target: TargetSpec,
) -> Result<Encoded, EngineError> {
    target.validate()?;
    let source = SourceImage::decode(bytes, origin)?;
    let Rendered { canvas, strategy } = render(source, target)?;
    let bytes = encode_jpeg(&canvas, OUTPUT_QUALITY).map_err(|e| EngineError::encode(origin, e))?;
    Ok(Encoded { bytes, strategy })
}

/// Normalize the image at `source` and write the JPEG to `dest`.
///
/// The destination directory must exist. `dest` is either fully written or
/// left untouched.
#[tracing::instrument(skip_all, fields(source = %source.display(), %target))]
pub fn normalize(source: &Path, target: TargetSpec, dest: &Path) -> Result<Strategy, EngineError> {
    target.validate()?;
    let origin = source.display().to_string();
    let data = std::fs::read(source).map_err(|e| EngineError::decode(&origin, e))?;
    let encoded = normalize_bytes(&data, &origin, target)?;
    write_atomic(dest, &encoded.bytes)
        .map_err(|e| EngineError::encode(dest.display().to_string(), e))?;
    debug!(dest = %dest.display(), bytes = encoded.bytes.len(), "written");
    Ok(encoded.strategy)
}
