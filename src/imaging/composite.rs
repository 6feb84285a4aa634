//! Three-layer composition for sources whose ratio diverges from the target.
//!
//! Bottom to top:
//!
//! 1. **Backdrop**: the center of the source at the canvas ratio, scaled to
//!    the canvas, blurred and darkened.
//! 2. **Shadow**: a soft black rectangle 10px larger than the foreground on
//!    every side. Skipped when the foreground is closer than 10px to an edge.
//! 3. **Foreground**: the source shrunk to fit inside the canvas (never
//!    enlarged) and centered.
//!
//! Every layer is built as a fresh buffer; only the final canvas is mutated
//! while the layers are pasted onto it.

use super::calculations::{
    calculate_fill_crop, calculate_fit_dimensions, center_offset, shadow_visible,
};
use super::params::{
    BACKGROUND_BLUR, BACKGROUND_DARKEN, SHADOW_ALPHA, SHADOW_BLUR, SHADOW_INSET, TargetSpec,
};
use super::source::NormalizedImage;
use image::imageops;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

/// The centered foreground and where it goes on the canvas.
///
/// Always opaque: transparency was flattened onto white before any layer
/// is built, so the foreground covers its rectangle completely.
#[derive(Debug, Clone)]
pub struct Foreground {
    pub image: RgbImage,
    /// Top-left corner on the canvas.
    pub placement: (u32, u32),
}

impl Foreground {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Build the full composite canvas.
pub fn composite(image: &NormalizedImage, target: TargetSpec) -> RgbImage {
    let mut canvas = background_layer(image, target);
    let foreground = foreground_layer(image, target);

    if shadow_visible(foreground.placement) {
        let shadow = shadow_layer(foreground.dimensions());
        let (x, y) = foreground.placement;
        paste_masked(&mut canvas, &shadow, x - SHADOW_INSET, y - SHADOW_INSET);
    } else {
        debug!(placement = ?foreground.placement, "foreground too close to edge, no shadow");
    }

    paste_foreground(&mut canvas, &foreground);
    canvas
}

/// Full-bleed backdrop: crop to the target ratio, scale, blur, darken.
pub fn background_layer(image: &NormalizedImage, target: TargetSpec) -> RgbImage {
    let region = calculate_fill_crop(image.dimensions(), target.dimensions());
    let filled = image.resampled_region(region, target.dimensions());
    let blurred = imageops::blur(&filled, BACKGROUND_BLUR);
    darken(&blurred, BACKGROUND_DARKEN)
}

/// Fit-inside thumbnail of the source, centered on the canvas.
pub fn foreground_layer(image: &NormalizedImage, target: TargetSpec) -> Foreground {
    let fitted = calculate_fit_dimensions(image.dimensions(), target.dimensions());
    let thumbnail = image.resampled(fitted);
    Foreground {
        image: thumbnail,
        placement: center_offset(target.dimensions(), fitted),
    }
}

/// Soft drop shadow for a foreground of `foreground` dimensions.
///
/// The buffer is `SHADOW_INSET` larger than the foreground on every side and
/// is meant to be pasted `SHADOW_INSET` up and left of the foreground.
pub fn shadow_layer(foreground: (u32, u32)) -> RgbaImage {
    let (fg_w, fg_h) = foreground;
    let width = fg_w + 2 * SHADOW_INSET;
    let height = fg_h + 2 * SHADOW_INSET;

    let shape = RgbaImage::from_fn(width, height, |x, y| {
        let inside = (SHADOW_INSET..SHADOW_INSET + fg_w).contains(&x)
            && (SHADOW_INSET..SHADOW_INSET + fg_h).contains(&y);
        if inside {
            Rgba([0, 0, 0, SHADOW_ALPHA])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    imageops::blur(&shape, SHADOW_BLUR)
}

/// Multiply every channel by `factor`.
pub fn darken(image: &RgbImage, factor: f32) -> RgbImage {
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Paste the opaque foreground over everything below it.
pub fn paste_foreground(canvas: &mut RgbImage, foreground: &Foreground) {
    let (x, y) = foreground.placement;
    imageops::replace(canvas, &foreground.image, x as i64, y as i64);
}

/// Blend `layer` onto `canvas` at `(x, y)` using its alpha as the mask.
/// Pixels falling outside the canvas are dropped.
pub fn paste_masked(canvas: &mut RgbImage, layer: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, pixel) in layer.enumerate_pixels() {
        let (cx, cy) = (x + dx, y + dy);
        if cx >= canvas.width() || cy >= canvas.height() {
            continue;
        }
        let alpha = pixel[3] as u32;
        if alpha == 0 {
            continue;
        }
        let under = canvas.get_pixel_mut(cx, cy);
        for c in 0..3 {
            let blended = (pixel[c] as u32 * alpha + under[c] as u32 * (255 - alpha) + 127) / 255;
            under[c] = blended as u8;
        }
    }
}
