//! Scale-to-cover plus center crop.
//!
//! Used when the source ratio is already close to the target's, so the crop
//! only trims a thin band from two edges.

use super::calculations::{calculate_cover_dimensions, center_offset};
use super::params::TargetSpec;
use super::source::NormalizedImage;
use image::RgbImage;
use image::imageops;

/// Resize `image` to cover `target`, then crop the center to exactly `target`.
pub fn direct_fit(image: &NormalizedImage, target: TargetSpec) -> RgbImage {
    let covered = calculate_cover_dimensions(image.dimensions(), target.dimensions());
    let scaled = image.resampled(covered);
    let (left, top) = center_offset(covered, target.dimensions());
    imageops::crop_imm(&scaled, left, top, target.width, target.height).to_image()
}
