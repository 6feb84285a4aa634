//! # metacanvas
//!
//! Builds the `meta/` media folder of a game from arbitrary artwork. Any
//! source image, at any size and aspect ratio, comes out as a fixed-size JPEG:
//! 512x512 for the icon, 1920x1080 for the background and screenshots.
//!
//! # Architecture
//!
//! ```text
//! MediaJob ─► plan ─► [WorkItem | CopyItem] ─► rayon pool ─► meta/
//!                         │
//!                         └─► imaging::normalize(source, target, dest)
//! ```
//!
//! The imaging engine is a pure function per image. The batch driver around
//! it owns everything stateful: the worker pool, progress reporting,
//! cancellation and the fail-fast policy.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The normalization engine: decode, classify, fit or composite, encode |
//! | [`process`] | Batch driver: job planning, parallel execution, progress events, audio copy |
//! | [`inventory`] | Reads back what an existing `meta/` folder contains |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`types`] | Asset classes, slots and work items shared by the modules above |
//! | [`naming`] | The fixed file layout of `meta/` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Strategies, One Threshold
//!
//! When the source ratio is within 0.1 of the target ratio, the image is
//! scaled to cover the canvas and center-cropped; the crop is small enough
//! to go unnoticed. Anything further off would lose too much to cropping or
//! show empty bars, so the image is instead shrunk to fit and centered over
//! a blurred, darkened fill of itself, with a soft drop shadow.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, Lanczos3 resampling, Gaussian blur and JPEG encoding all come
//! from the `image` crate. No system libraries, no external processes.
//!
//! ## All-or-Nothing Writes
//!
//! Outputs are encoded in memory and written through a temp file in the
//! destination directory that is renamed into place. A failed item leaves
//! the previous file (or no file) behind, never a truncated one.

pub mod config;
pub mod imaging;
pub mod inventory;
pub mod naming;
pub mod output;
pub mod process;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
