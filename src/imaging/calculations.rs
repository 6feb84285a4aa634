//! Pure calculation functions for canvas geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Dimensions are `(width, height)` tuples throughout.

use super::params::{RATIO_THRESHOLD, SHADOW_INSET};
use serde::Serialize;
use std::fmt;

/// Which transform branch a source takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Scale to cover, then center-crop.
    DirectFit,
    /// Blurred backdrop + shadow + centered foreground.
    Composite,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::DirectFit => f.write_str("direct fit"),
            Strategy::Composite => f.write_str("composite"),
        }
    }
}

pub fn aspect_ratio(dims: (u32, u32)) -> f64 {
    dims.0 as f64 / dims.1 as f64
}

/// Pick the transform branch for a source of `source` dimensions.
///
/// # Examples
/// ```
/// # use metacanvas::imaging::{Strategy, classify};
/// // 800x600 onto a square icon: 1.333 vs 1.0
/// assert_eq!(classify((800, 600), (512, 512)), Strategy::Composite);
/// // already 16:9
/// assert_eq!(classify((3840, 2160), (1920, 1080)), Strategy::DirectFit);
/// ```
pub fn classify(source: (u32, u32), target: (u32, u32)) -> Strategy {
    let diff = (aspect_ratio(source) - aspect_ratio(target)).abs();
    if diff < RATIO_THRESHOLD {
        Strategy::DirectFit
    } else {
        Strategy::Composite
    }
}

/// Smallest aspect-preserving size that covers `target` in both dimensions.
///
/// Uses the larger of the two per-axis scale factors. Each side is clamped
/// to at least the target side so the following center crop never reads
/// outside the image.
pub fn calculate_cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).max(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(tgt_w);
    let h = ((src_h as f64 * scale).round() as u32).max(tgt_h);
    (w, h)
}

/// Region of the source kept by the backdrop, as `(left, top, width, height)`
/// in source pixels.
///
/// This is the centered rectangle with the target's aspect ratio: wider
/// sources keep their full height and lose the sides, everything else keeps
/// its full width. Cropping before resampling keeps the backdrop buffer
/// bounded by the target, however extreme the source ratio is.
///
/// # Examples
/// ```
/// # use metacanvas::imaging::calculate_fill_crop;
/// // 800x600 onto a square icon: the middle 600x600
/// assert_eq!(calculate_fill_crop((800, 600), (512, 512)), (100, 0, 600, 600));
/// ```
pub fn calculate_fill_crop(source: (u32, u32), target: (u32, u32)) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = source;
    let tgt_aspect = aspect_ratio(target);

    let (w, h) = if aspect_ratio(source) > tgt_aspect {
        let w = ((src_h as f64 * tgt_aspect).round() as u32).clamp(1, src_w);
        (w, src_h)
    } else {
        let h = ((src_w as f64 / tgt_aspect).round() as u32).clamp(1, src_h);
        (src_w, h)
    };
    let (left, top) = center_offset(source, (w, h));
    (left, top, w, h)
}

/// Fit-inside size: shrink to fit within `bounds`, never enlarge.
///
/// # Examples
/// ```
/// # use metacanvas::imaging::calculate_fit_dimensions;
/// assert_eq!(calculate_fit_dimensions((800, 600), (512, 512)), (512, 384));
/// // Small sources keep their native size
/// assert_eq!(calculate_fit_dimensions((300, 100), (512, 512)), (300, 100));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let src_aspect = aspect_ratio(source);
    if src_aspect > aspect_ratio(bounds) {
        let h = ((max_w as f64 / src_aspect).round() as u32).clamp(1, max_h);
        (max_w, h)
    } else {
        let w = ((max_h as f64 * src_aspect).round() as u32).clamp(1, max_w);
        (w, max_h)
    }
}

/// Top-left offset that centers `inner` within `outer`, rounding down.
pub fn center_offset(outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

/// Whether the foreground sits far enough from the canvas edges for the
/// drop shadow margin to render.
pub fn shadow_visible(placement: (u32, u32)) -> bool {
    placement.0 >= SHADOW_INSET && placement.1 >= SHADOW_INSET
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // classify
    // =========================================================================

    #[test]
    fn classify_identical_ratio_is_direct() {
        assert_eq!(classify((1920, 1080), (1920, 1080)), Strategy::DirectFit);
        assert_eq!(classify((100, 100), (512, 512)), Strategy::DirectFit);
    }

    #[test]
    fn classify_landscape_onto_square_is_composite() {
        assert_eq!(classify((800, 600), (512, 512)), Strategy::Composite);
    }

    #[test]
    fn classify_just_under_threshold_is_direct() {
        // 1.09 vs 1.0
        assert_eq!(classify((109, 100), (512, 512)), Strategy::DirectFit);
    }

    #[test]
    fn classify_just_over_threshold_is_composite() {
        // 1.11 vs 1.0
        assert_eq!(classify((111, 100), (512, 512)), Strategy::Composite);
    }

    #[test]
    fn classify_difference_of_exactly_threshold_is_composite() {
        // 11:10 vs 1:1 differs by 0.1; only strictly smaller takes the fit
        assert_eq!(classify((11, 10), (1, 1)), Strategy::Composite);
        assert_eq!(classify((110, 100), (512, 512)), Strategy::Composite);
    }

    #[test]
    fn classify_portrait_onto_widescreen_is_composite() {
        assert_eq!(classify((1080, 1920), (1920, 1080)), Strategy::Composite);
    }

    // =========================================================================
    // cover dimensions
    // =========================================================================

    #[test]
    fn cover_same_size_is_identity() {
        assert_eq!(
            calculate_cover_dimensions((1920, 1080), (1920, 1080)),
            (1920, 1080)
        );
    }

    #[test]
    fn cover_downscales_larger_source() {
        assert_eq!(
            calculate_cover_dimensions((3840, 2160), (1920, 1080)),
            (1920, 1080)
        );
    }

    #[test]
    fn cover_slightly_wider_source_overflows_width() {
        // 2000x1080 is wider than 16:9: height matches, width exceeds
        assert_eq!(
            calculate_cover_dimensions((2000, 1080), (1920, 1080)),
            (2000, 1080)
        );
    }

    #[test]
    fn cover_upscales_small_source() {
        assert_eq!(calculate_cover_dimensions((100, 100), (512, 512)), (512, 512));
    }

    #[test]
    fn cover_never_smaller_than_target() {
        for src in [(333, 331), (7, 7), (1921, 1079), (641, 360)] {
            let (w, h) = calculate_cover_dimensions(src, (1920, 1080));
            assert!(w >= 1920 && h >= 1080, "{src:?} -> {w}x{h}");
        }
    }

    // =========================================================================
    // fill crop (backdrop)
    // =========================================================================

    #[test]
    fn fill_crop_wider_source_trims_sides() {
        assert_eq!(calculate_fill_crop((800, 600), (512, 512)), (100, 0, 600, 600));
    }

    #[test]
    fn fill_crop_taller_source_trims_top_and_bottom() {
        // 1000x2000 onto 2:1 keeps a 1000x500 band from the middle
        assert_eq!(calculate_fill_crop((1000, 2000), (200, 100)), (0, 750, 1000, 500));
    }

    #[test]
    fn fill_crop_matching_ratio_keeps_everything() {
        assert_eq!(calculate_fill_crop((3840, 2160), (1920, 1080)), (0, 0, 3840, 2160));
    }

    #[test]
    fn fill_crop_thin_strip_stays_inside_source() {
        for src in [(1, 5000), (5000, 1), (1, 1), (3, 7)] {
            let (left, top, w, h) = calculate_fill_crop(src, (1920, 1080));
            assert!(w >= 1 && h >= 1, "{src:?}");
            assert!(left + w <= src.0 && top + h <= src.1, "{src:?}");
        }
        // A 1px wide strip keeps a single pixel from its middle
        assert_eq!(calculate_fill_crop((1, 5000), (1920, 1080)), (0, 2499, 1, 1));
    }

    // =========================================================================
    // fit-inside dimensions (foreground)
    // =========================================================================

    #[test]
    fn fit_shrinks_landscape() {
        assert_eq!(calculate_fit_dimensions((800, 600), (512, 512)), (512, 384));
    }

    #[test]
    fn fit_shrinks_portrait() {
        assert_eq!(
            calculate_fit_dimensions((1080, 1920), (1920, 1080)),
            (608, 1080)
        );
    }

    #[test]
    fn fit_never_enlarges() {
        assert_eq!(calculate_fit_dimensions((200, 50), (512, 512)), (200, 50));
        assert_eq!(calculate_fit_dimensions((512, 512), (512, 512)), (512, 512));
    }

    #[test]
    fn fit_extreme_ratio_keeps_one_pixel() {
        assert_eq!(calculate_fit_dimensions((10_000, 1), (512, 512)), (512, 1));
    }

    // =========================================================================
    // placement
    // =========================================================================

    #[test]
    fn center_offset_rounds_down() {
        assert_eq!(center_offset((512, 512), (512, 384)), (0, 64));
        assert_eq!(center_offset((11, 11), (4, 4)), (3, 3));
    }

    #[test]
    fn shadow_requires_inset_on_both_axes() {
        assert!(shadow_visible((10, 10)));
        assert!(shadow_visible((656, 10)));
        assert!(!shadow_visible((4, 200)));
        assert!(!shadow_visible((200, 9)));
    }
}
