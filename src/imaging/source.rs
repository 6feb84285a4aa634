//! Decoded sources and color normalization.
//!
//! A [`SourceImage`] is tagged by its color mode. Each variant has exactly
//! one conversion into [`NormalizedImage`], the opaque RGB representation
//! every later stage works on. Anything with transparency is flattened onto
//! solid white.

use super::backend::EngineError;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayAlphaImage, GrayImage, Rgb, RgbImage, Rgba, RgbaImage};

const WHITE: u8 = 255;

/// Indexed-color pixels plus their palette.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteImage {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    palette: Vec<Rgba<u8>>,
}

impl PaletteImage {
    /// Build an indexed image. Every index must resolve to a palette entry.
    pub fn new(
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<Rgba<u8>>,
    ) -> Result<Self, EngineError> {
        let expected = width as usize * height as usize;
        if indices.len() != expected {
            return Err(EngineError::decode(
                "palette image",
                format!("expected {expected} indices, got {}", indices.len()),
            ));
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
            return Err(EngineError::decode(
                "palette image",
                format!("index {bad} outside palette of {} colors", palette.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            indices,
            palette,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A decoded source, tagged by color mode.
#[derive(Debug, Clone)]
pub enum SourceImage {
    TrueColor(RgbImage),
    TrueColorAlpha(RgbaImage),
    Gray(GrayImage),
    GrayAlpha(GrayAlphaImage),
    Palette(PaletteImage),
}

impl SourceImage {
    /// Decode raster bytes. `origin` names the source in errors.
    pub fn decode(bytes: &[u8], origin: &str) -> Result<Self, EngineError> {
        let img = image::load_from_memory(bytes).map_err(|e| EngineError::decode(origin, e))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(EngineError::decode(origin, "image has no pixels"));
        }
        Ok(Self::from(img))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::TrueColor(img) => img.dimensions(),
            Self::TrueColorAlpha(img) => img.dimensions(),
            Self::Gray(img) => img.dimensions(),
            Self::GrayAlpha(img) => img.dimensions(),
            Self::Palette(img) => img.dimensions(),
        }
    }

    /// Flatten to opaque RGB over a white backing.
    pub fn into_normalized(self) -> NormalizedImage {
        let rgb = match self {
            Self::TrueColor(img) => img,
            Self::TrueColorAlpha(img) => flatten_rgba(&img),
            Self::Gray(img) => RgbImage::from_fn(img.width(), img.height(), |x, y| {
                let l = img.get_pixel(x, y)[0];
                Rgb([l, l, l])
            }),
            Self::GrayAlpha(img) => RgbImage::from_fn(img.width(), img.height(), |x, y| {
                let [l, a] = img.get_pixel(x, y).0;
                let v = over_white(l, a);
                Rgb([v, v, v])
            }),
            Self::Palette(img) => RgbImage::from_fn(img.width, img.height, |x, y| {
                let index = img.indices[(y * img.width + x) as usize];
                flatten_pixel(img.palette[index as usize])
            }),
        };
        NormalizedImage(rgb)
    }
}

impl From<DynamicImage> for SourceImage {
    /// Decoders expand palettes, so decoded files land in the direct-color
    /// variants. Deeper formats are reduced to 8 bits per channel.
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageRgb8(img) => Self::TrueColor(img),
            DynamicImage::ImageRgba8(img) => Self::TrueColorAlpha(img),
            DynamicImage::ImageLuma8(img) => Self::Gray(img),
            DynamicImage::ImageLumaA8(img) => Self::GrayAlpha(img),
            other if other.color().has_alpha() => Self::TrueColorAlpha(other.to_rgba8()),
            other => Self::TrueColor(other.to_rgb8()),
        }
    }
}

/// `pixel * alpha + white * (1 - alpha)`, rounded.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((channel as u32 * a + WHITE as u32 * (255 - a) + 127) / 255) as u8
}

fn flatten_pixel(pixel: Rgba<u8>) -> Rgb<u8> {
    let [r, g, b, a] = pixel.0;
    Rgb([over_white(r, a), over_white(g, a), over_white(b, a)])
}

fn flatten_rgba(img: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        flatten_pixel(*img.get_pixel(x, y))
    })
}

/// Opaque RGB pixels. No alpha channel exists at this point.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage(RgbImage);

impl NormalizedImage {
    pub fn as_rgb(&self) -> &RgbImage {
        &self.0
    }

    pub fn into_rgb(self) -> RgbImage {
        self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Lanczos3 resample to exactly `dims`. Same-size requests copy the
    /// pixels untouched.
    pub fn resampled(&self, dims: (u32, u32)) -> RgbImage {
        if self.0.dimensions() == dims {
            return self.0.clone();
        }
        imageops::resize(&self.0, dims.0, dims.1, FilterType::Lanczos3)
    }

    /// Crop `(left, top, width, height)` and Lanczos3 resample only that
    /// region to exactly `dims`.
    pub fn resampled_region(&self, region: (u32, u32, u32, u32), dims: (u32, u32)) -> RgbImage {
        let (left, top, width, height) = region;
        let view = imageops::crop_imm(&self.0, left, top, width, height);
        if (width, height) == dims {
            return view.to_image();
        }
        imageops::resize(&*view, dims.0, dims.1, FilterType::Lanczos3)
    }
}

impl From<RgbImage> for NormalizedImage {
    fn from(img: RgbImage) -> Self {
        Self(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, LumaA};
    use std::io::Cursor;

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn transparent_pixel_becomes_white() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));

        let normalized = SourceImage::TrueColorAlpha(img).into_normalized();
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*normalized.as_rgb().get_pixel(1, 1), Rgb([10, 20, 30]));
    }

    #[test]
    fn half_transparent_pixel_blends_with_white() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let normalized = SourceImage::TrueColorAlpha(img).into_normalized();
        // 255 * 127 / 255 = 127
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([127, 127, 127]));
    }

    #[test]
    fn gray_alpha_expands_to_rgb() {
        let mut img = GrayAlphaImage::from_pixel(2, 1, LumaA([40, 255]));
        img.put_pixel(1, 0, LumaA([40, 0]));
        let normalized = SourceImage::GrayAlpha(img).into_normalized();
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([40, 40, 40]));
        assert_eq!(*normalized.as_rgb().get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn palette_resolves_indices_and_transparency() {
        let palette = vec![Rgba([255, 0, 0, 255]), Rgba([0, 0, 255, 0])];
        let img = PaletteImage::new(2, 1, vec![0, 1], palette).unwrap();
        let normalized = SourceImage::Palette(img).into_normalized();
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*normalized.as_rgb().get_pixel(1, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn palette_rejects_out_of_range_index() {
        let result = PaletteImage::new(1, 1, vec![3], vec![Rgba([0, 0, 0, 255])]);
        assert!(matches!(result, Err(EngineError::Decode { .. })));
    }

    #[test]
    fn palette_rejects_wrong_index_count() {
        let result = PaletteImage::new(2, 2, vec![0], vec![Rgba([0, 0, 0, 255])]);
        assert!(result.is_err());
    }

    #[test]
    fn decode_png_keeps_dimensions_and_mode() {
        let bytes = png_bytes(DynamicImage::ImageRgba8(RgbaImage::new(7, 3)));
        let source = SourceImage::decode(&bytes, "test.png").unwrap();
        assert_eq!(source.dimensions(), (7, 3));
        assert!(matches!(source, SourceImage::TrueColorAlpha(_)));
    }

    #[test]
    fn decode_png_with_transparent_corner() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 128, 0, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let bytes = png_bytes(DynamicImage::ImageRgba8(img));

        let normalized = SourceImage::decode(&bytes, "corner.png")
            .unwrap()
            .into_normalized();
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(normalized.dimensions(), (8, 8));
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let err = SourceImage::decode(b"definitely not an image", "notes.txt").unwrap_err();
        assert!(matches!(err, EngineError::Decode { ref origin, .. } if origin == "notes.txt"));
    }

    #[test]
    fn sixteen_bit_sources_reduce_to_eight_bits() {
        let img = DynamicImage::ImageRgb16(image::ImageBuffer::from_pixel(
            2,
            2,
            Rgb([65535u16, 0, 0]),
        ));
        let source = SourceImage::from(img);
        assert!(matches!(source, SourceImage::TrueColor(_)));
        let normalized = source.into_normalized();
        assert_eq!(*normalized.as_rgb().get_pixel(0, 0), Rgb([255, 0, 0]));
    }

    #[test]
    fn resampled_same_size_is_identical() {
        let img = RgbImage::from_fn(16, 9, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let normalized = NormalizedImage::from(img.clone());
        assert_eq!(normalized.resampled((16, 9)), img);
    }

    #[test]
    fn resampled_hits_requested_size() {
        let normalized = NormalizedImage::from(RgbImage::new(100, 50));
        assert_eq!(normalized.resampled((37, 11)).dimensions(), (37, 11));
    }

    #[test]
    fn resampled_region_reads_only_the_region() {
        let img = RgbImage::from_fn(16, 9, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let normalized = NormalizedImage::from(img.clone());

        let same = normalized.resampled_region((4, 2, 8, 5), (8, 5));
        assert_eq!(same.dimensions(), (8, 5));
        assert_eq!(same.get_pixel(0, 0), img.get_pixel(4, 2));
        assert_eq!(same.get_pixel(7, 4), img.get_pixel(11, 6));

        let strip = NormalizedImage::from(RgbImage::new(1, 5000));
        let scaled = strip.resampled_region((0, 2499, 1, 1), (64, 36));
        assert_eq!(scaled.dimensions(), (64, 36));
    }
}
