//! Output file naming for the `meta/` folder.
//!
//! Every slot has exactly one destination. The layout is fixed:
//!
//! ```text
//! <game>/meta/
//! ├── icon.jpg
//! ├── background.jpg
//! ├── effect.mp3
//! ├── theme.mp3
//! └── screens/
//!     ├── screen0.jpg
//!     ├── screen1.jpg
//!     └── ...
//! ```
//!
//! Screenshot numbering is 0-based and contiguous. Names like `screen01.jpg`
//! are not part of the sequence.

use crate::types::{AssetSlot, AudioKind};
use std::path::{Path, PathBuf};

/// Folder inside the game directory holding all media.
pub const META_DIR: &str = "meta";

/// Subfolder of [`META_DIR`] holding screenshots.
pub const SCREENS_DIR: &str = "screens";

/// Highest number of screenshots looked up when scanning a folder.
pub const MAX_SCREENS: usize = 100;

/// File name of a slot, without directory.
pub fn file_name(slot: AssetSlot) -> String {
    match slot {
        AssetSlot::Icon => "icon.jpg".to_string(),
        AssetSlot::Background => "background.jpg".to_string(),
        AssetSlot::Screenshot(i) => format!("screen{i}.jpg"),
        AssetSlot::Audio(AudioKind::Effect) => "effect.mp3".to_string(),
        AssetSlot::Audio(AudioKind::Theme) => "theme.mp3".to_string(),
    }
}

/// Full destination of a slot under `meta_dir`.
pub fn destination(meta_dir: &Path, slot: AssetSlot) -> PathBuf {
    match slot {
        AssetSlot::Screenshot(_) => meta_dir.join(SCREENS_DIR).join(file_name(slot)),
        _ => meta_dir.join(file_name(slot)),
    }
}

/// Parse the index out of a screenshot file name.
///
/// - `"screen0.jpg"` → `Some(0)`
/// - `"screen12.jpg"` → `Some(12)`
/// - `"screen01.jpg"`, `"screen.jpg"`, `"screen3.png"` → `None`
pub fn parse_screen_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix("screen")?.strip_suffix(".jpg")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}
