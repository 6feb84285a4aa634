//! JPEG encoding and all-or-nothing file writes.
//!
//! The canvas is encoded fully in memory first. Writing goes through a
//! temporary file in the destination directory which is renamed over the
//! destination only once every byte is on disk, so a failed write never
//! leaves a truncated or zero-byte file behind.

use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Encode an RGB canvas as baseline JPEG.
pub fn encode_jpeg(canvas: &RgbImage, quality: Quality) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.value()).write_image(
        canvas.as_raw(),
        canvas.width(),
        canvas.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Write `bytes` to `dest` atomically via a sibling temp file.
///
/// A replaced file keeps its permissions. A new file gets the same mode
/// `fs::write` would give it.
pub fn write_atomic(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let existing = fs::metadata(dest).ok().map(|meta| meta.permissions());
    persist_staged(dest, bytes, |file| match existing {
        Some(permissions) => file.set_permissions(permissions),
        None => Ok(()),
    })
}

/// Copy `source` to `dest` atomically, keeping the source's permissions and
/// modification time.
pub fn copy_atomic(source: &Path, dest: &Path) -> io::Result<()> {
    let bytes = fs::read(source)?;
    let meta = fs::metadata(source)?;
    persist_staged(dest, &bytes, |file| {
        file.set_permissions(meta.permissions())?;
        file.set_modified(meta.modified()?)
    })
}

fn persist_staged(
    dest: &Path,
    bytes: &[u8],
    finish: impl FnOnce(&File) -> io::Result<()>,
) -> io::Result<()> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".metacanvas-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Subject to the umask, like fs::write
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(dir)?;
    staged.write_all(bytes)?;
    finish(staged.as_file())?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
