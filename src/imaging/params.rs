//! Parameter types and fixed constants for the normalization engine.
//!
//! These describe *what* the engine produces, not *how*. The constants are
//! part of the output's visual identity: changing any of them changes every
//! composited asset, so none of them are exposed through `config.toml`.
//!
//! ## Types
//!
//! - [`TargetSpec`]: output canvas dimensions. Both sides must be positive.
//! - [`Quality`]: JPEG encoding quality (1–100). Clamped on construction.

use super::backend::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aspect ratios closer than this take the direct fit path.
pub const RATIO_THRESHOLD: f64 = 0.1;

/// Gaussian blur sigma applied to the composite backdrop.
pub const BACKGROUND_BLUR: f32 = 15.0;

/// Channel multiplier applied to the blurred backdrop.
pub const BACKGROUND_DARKEN: f32 = 0.3;

/// Gaussian blur sigma applied to the drop shadow.
pub const SHADOW_BLUR: f32 = 5.0;

/// Alpha of the drop shadow before blurring.
pub const SHADOW_ALPHA: u8 = 128;

/// Shadow margin in pixels. Also the minimum foreground offset for the
/// shadow to be drawn at all.
pub const SHADOW_INSET: u32 = 10;

/// JPEG quality used for every output.
pub const OUTPUT_QUALITY: Quality = Quality(95);

/// Fixed output dimensions for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    pub width: u32,
    pub height: u32,
}

impl TargetSpec {
    /// Build a target, rejecting zero-sized sides.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        let spec = Self { width, height };
        spec.validate()?;
        Ok(spec)
    }

    /// 512×512.
    pub const fn icon() -> Self {
        Self {
            width: 512,
            height: 512,
        }
    }

    /// 1920×1080, shared by backgrounds and screenshots.
    pub const fn widescreen() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::InvalidTargetSpec {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Parse `WIDTHxHEIGHT`, e.g. `1280x720`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let (w, h) = input
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{input}'"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        Self::new(width, height).map_err(|e| e.to_string())
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        OUTPUT_QUALITY
    }
}
