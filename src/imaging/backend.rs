//! Image backend trait and shared error type.
//!
//! The [`ImageBackend`] trait defines the two operations the batch driver
//! needs: identify a source, and normalize it into a destination file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), which runs the
//! [`engine`](super::engine) in-process. Tests substitute a recording mock so
//! the batch driver can be exercised without encoding real images.

use super::calculations::Strategy;
use super::params::TargetSpec;
use std::path::Path;
use thiserror::Error;

/// Failure of a single normalization. Never affects other images.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The source could not be read or is not a supported raster image.
    #[error("failed to decode {origin}: {reason}")]
    Decode { origin: String, reason: String },
    /// The canvas could not be encoded or the destination could not be written.
    #[error("failed to write {destination}: {reason}")]
    Encode { destination: String, reason: String },
    /// Caller contract violation: a zero-sized target.
    #[error("invalid target size {width}x{height}: both sides must be positive")]
    InvalidTargetSpec { width: u32, height: u32 },
}

impl EngineError {
    pub fn decode(origin: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(destination: impl Into<String>, reason: impl ToString) -> Self {
        Self::Encode {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image backends.
///
/// Implementations must be `Sync`: the batch driver calls them from rayon
/// worker threads.
pub trait ImageBackend: Sync {
    /// Read source dimensions without rendering.
    fn identify(&self, path: &Path) -> Result<Dimensions, EngineError>;

    /// Normalize `source` onto a `target` canvas and write it to `dest`.
    ///
    /// Returns the strategy that produced the canvas.
    fn normalize(
        &self,
        source: &Path,
        target: TargetSpec,
        dest: &Path,
    ) -> Result<Strategy, EngineError>;
}
