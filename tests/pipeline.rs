//! End-to-end tests of the public API: single-image normalization on disk,
//! then a full batch written to a game folder, inspected and rebuilt.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use metacanvas::config::MetaConfig;
use metacanvas::imaging::{
    RustBackend, SourceImage, Strategy, TargetSpec, normalize, normalize_bytes, render,
};
use metacanvas::inventory;
use metacanvas::process::{self, ItemStatus, MediaJob, ProcessEvent};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn busy(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([230, 200, 40])
        } else {
            Rgb([20, 60, 200])
        }
    })
}

fn write_png(path: &Path, img: RgbImage) -> PathBuf {
    img.save_with_format(path, ImageFormat::Png).unwrap();
    path.to_path_buf()
}

fn luma(p: &Rgb<u8>) -> f64 {
    0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64
}

/// Mean and variance of luma over a square patch.
fn patch_stats(img: &RgbImage, x0: u32, y0: u32, size: u32) -> (f64, f64) {
    let values: Vec<f64> = (y0..y0 + size)
        .flat_map(|y| (x0..x0 + size).map(move |x| (x, y)))
        .map(|(x, y)| luma(img.get_pixel(x, y)))
        .collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, var)
}

// =========================================================================
// Single image
// =========================================================================

#[test]
fn landscape_source_onto_square_icon_composites() {
    let tmp = TempDir::new().unwrap();
    let source = write_png(&tmp.path().join("art.png"), busy(800, 600));
    let dest = tmp.path().join("icon.jpg");

    let strategy = normalize(&source, TargetSpec::icon(), &dest).unwrap();
    assert_eq!(strategy, Strategy::Composite);

    let out = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (512, 512));

    // Foreground is 512x384 centered: the 64px bands above and below are backdrop
    let (src_mean, src_var) = patch_stats(&busy(800, 600), 0, 0, 32);
    let (bg_mean, bg_var) = patch_stats(&out, 8, 8, 32);
    assert!(bg_mean < src_mean * 0.5, "backdrop mean {bg_mean} vs {src_mean}");
    assert!(bg_var < src_var * 0.1, "backdrop variance {bg_var} vs {src_var}");
}

#[test]
fn matching_source_takes_direct_fit_without_cropping() {
    let tmp = TempDir::new().unwrap();
    let source = write_png(&tmp.path().join("bg.png"), busy(1920, 1080));
    let dest = tmp.path().join("background.jpg");

    let strategy = normalize(&source, TargetSpec::widescreen(), &dest).unwrap();
    assert_eq!(strategy, Strategy::DirectFit);

    let out = image::open(&dest).unwrap().to_rgb8();
    assert_eq!(out.dimensions(), (1920, 1080));
    // Corners keep the sharp source pattern
    let (_, var) = patch_stats(&out, 0, 0, 32);
    assert!(var > 1000.0, "corner variance {var}");
}

#[test]
fn transparent_pixel_becomes_white() {
    let mut img = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
    img.put_pixel(0, 0, Rgba([10, 20, 30, 0]));

    let rendered = render(
        SourceImage::from(DynamicImage::ImageRgba8(img)),
        TargetSpec::new(64, 64).unwrap(),
    )
    .unwrap();
    assert_eq!(*rendered.canvas.get_pixel(0, 0), Rgb([255, 255, 255]));
    assert_eq!(*rendered.canvas.get_pixel(1, 0), Rgb([10, 20, 30]));
}

#[test]
fn output_always_matches_target() {
    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(busy(37, 211))
        .write_to(&mut png, ImageFormat::Png)
        .unwrap();
    let bytes = png.into_inner();

    for (w, h) in [(8, 8), (512, 512), (300, 17), (17, 300), (64, 36)] {
        let target = TargetSpec::new(w, h).unwrap();
        let encoded = normalize_bytes(&bytes, "tall.png", target).unwrap();
        let decoded = image::load_from_memory(&encoded.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (w, h));
    }
}

#[test]
fn normalize_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    let source = write_png(&tmp.path().join("s.png"), busy(300, 120));
    let a = tmp.path().join("a.jpg");
    let b = tmp.path().join("b.jpg");
    let target = TargetSpec::new(160, 90).unwrap();

    normalize(&source, target, &a).unwrap();
    normalize(&source, target, &b).unwrap();
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn undecodable_source_leaves_no_output() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("notes.png");
    fs::write(&source, "not an image").unwrap();
    let dest = tmp.path().join("icon.jpg");

    assert!(normalize(&source, TargetSpec::icon(), &dest).is_err());
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
}

// =========================================================================
// Batch
// =========================================================================

fn small_config() -> MetaConfig {
    let mut config = MetaConfig::default();
    config.targets.icon = [64, 64];
    config.targets.background = [96, 54];
    config.targets.screenshot = [96, 54];
    config
}

#[test]
fn build_inspect_rebuild() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let game = tmp.path().join("game");

    let mut job = MediaJob {
        icon: Some(write_png(&src.join("logo.png"), busy(120, 40))),
        background: Some(write_png(&src.join("bg.png"), busy(192, 108))),
        theme: Some(src.join("theme.mp3")),
        ..MediaJob::default()
    };
    fs::write(src.join("theme.mp3"), b"ID3 theme").unwrap();
    job.add_screen(write_png(&src.join("s1.png"), busy(50, 200)));
    job.add_screen(write_png(&src.join("s2.png"), busy(200, 110)));

    let config = small_config();
    let (tx, rx) = std::sync::mpsc::channel();
    let report = process::process(&job, &game, &config, Some(tx)).unwrap();
    assert!(report.is_success(), "{report:?}");

    let statuses: Vec<&ItemStatus> = report.items.iter().map(|i| &i.status).collect();
    assert_eq!(
        statuses,
        vec![
            &ItemStatus::Normalized {
                strategy: Strategy::Composite
            },
            &ItemStatus::Normalized {
                strategy: Strategy::DirectFit
            },
            &ItemStatus::Normalized {
                strategy: Strategy::Composite
            },
            &ItemStatus::Normalized {
                strategy: Strategy::DirectFit
            },
            &ItemStatus::Copied,
        ]
    );

    let events: Vec<ProcessEvent> = rx.iter().collect();
    assert!(matches!(
        events.last(),
        Some(ProcessEvent::Completed { cancelled: false })
    ));

    // Inspect what was written
    let found = inventory::inspect(&game).unwrap();
    assert_eq!(
        found.found(),
        vec!["icon", "background", "2 screenshots", "theme audio"]
    );
    let checks = inventory::check_images(&found, &RustBackend::new(), &config.targets);
    assert_eq!(checks.len(), 4);
    assert!(checks.iter().all(|c| c.conforms()), "{checks:?}");

    // Rebuild in place at new sizes
    let mut bigger = small_config();
    bigger.targets.icon = [80, 80];
    let report = process::process(&found.into_job(), &game, &bigger, None).unwrap();
    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.items.last().unwrap().status, ItemStatus::Unchanged);
    assert_eq!(
        image::image_dimensions(game.join("meta/icon.jpg")).unwrap(),
        (80, 80)
    );
    assert_eq!(fs::read(game.join("meta/theme.mp3")).unwrap(), b"ID3 theme");
}

#[test]
fn broken_screenshot_does_not_stop_the_batch() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    let broken = src.join("broken.png");
    fs::write(&broken, b"\x89PNG\r\n\x1a\n garbage").unwrap();

    let job = MediaJob {
        icon: Some(write_png(&src.join("logo.png"), busy(64, 64))),
        background: Some(write_png(&src.join("bg.png"), busy(96, 54))),
        screens: vec![broken, write_png(&src.join("ok.png"), busy(96, 54))],
        ..MediaJob::default()
    };

    let game = tmp.path().join("game");
    let report = process::process(&job, &game, &small_config(), None).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failed().count(), 1);
    assert_eq!(report.succeeded(), 3);
    assert!(!game.join("meta/screens/screen0.jpg").exists());
    assert!(game.join("meta/screens/screen1.jpg").exists());
}

#[test]
fn empty_job_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let err = process::process(&MediaJob::default(), tmp.path(), &MetaConfig::default(), None)
        .unwrap_err();
    assert_eq!(err.to_string(), "No media to process.");
    assert!(!tmp.path().join("meta").exists());
}
