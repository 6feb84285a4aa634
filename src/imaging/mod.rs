//! Image normalization in pure Rust, no system libraries.
//!
//! | Stage | Module |
//! |---|---|
//! | **Decode + color normalize** | [`source`] |
//! | **Classify** | `calculations::classify` |
//! | **Direct fit** | [`direct_fit`] |
//! | **Composite** | [`composite`] |
//! | **Encode + write** | [`encode`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Fixed constants and the [`TargetSpec`] type
//! - **Pixel stages**: source, direct_fit, composite, encode
//! - **Engine**: [`normalize`] and friends, tying the stages together
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod composite;
pub mod direct_fit;
pub mod encode;
pub mod engine;
mod params;
pub mod rust_backend;
pub mod source;

pub use backend::{Dimensions, EngineError, ImageBackend};
pub use calculations::{
    Strategy, aspect_ratio, calculate_cover_dimensions, calculate_fill_crop,
    calculate_fit_dimensions, center_offset, classify, shadow_visible,
};
pub use engine::{Encoded, Rendered, normalize, normalize_bytes, render};
pub use params::{
    BACKGROUND_BLUR, BACKGROUND_DARKEN, OUTPUT_QUALITY, Quality, RATIO_THRESHOLD, SHADOW_ALPHA,
    SHADOW_BLUR, SHADOW_INSET, TargetSpec,
};
pub use rust_backend::RustBackend;
pub use source::{NormalizedImage, PaletteImage, SourceImage};
