//! Discover the media already present in a game folder.
//!
//! Looks for the fixed file names under `<game>/meta/`. Screenshots are
//! picked up as `screen0.jpg`, `screen1.jpg`, ... up to [`MAX_SCREENS`],
//! stopping at the first missing index. Screenshot files past that gap are
//! listed separately as stray so the user can see why they were not loaded.
//!
//! An inventory can be turned back into a [`MediaJob`] to rebuild the folder
//! in place, e.g. after changing target sizes.

use crate::config::TargetsConfig;
use crate::imaging::{Dimensions, ImageBackend};
use crate::naming::{self, MAX_SCREENS, META_DIR, SCREENS_DIR};
use crate::process::MediaJob;
use crate::types::{AssetSlot, AudioKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("No meta folder in {0}")]
    NoMetaDir(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Media found in a `meta/` folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub meta_dir: PathBuf,
    pub icon: Option<PathBuf>,
    pub background: Option<PathBuf>,
    pub screens: Vec<PathBuf>,
    pub effect: Option<PathBuf>,
    pub theme: Option<PathBuf>,
    /// `screen{N}.jpg` files not reachable without a gap, sorted by index.
    pub stray_screens: Vec<PathBuf>,
}

impl Inventory {
    pub fn is_empty(&self) -> bool {
        self.icon.is_none()
            && self.background.is_none()
            && self.screens.is_empty()
            && self.effect.is_none()
            && self.theme.is_none()
    }

    /// Human summary of what was found: `["icon", "3 screenshots", ...]`.
    pub fn found(&self) -> Vec<String> {
        let mut found = Vec::new();
        if self.icon.is_some() {
            found.push("icon".to_string());
        }
        if self.background.is_some() {
            found.push("background".to_string());
        }
        match self.screens.len() {
            0 => {}
            1 => found.push("1 screenshot".to_string()),
            n => found.push(format!("{n} screenshots")),
        }
        if self.effect.is_some() {
            found.push("effect audio".to_string());
        }
        if self.theme.is_some() {
            found.push("theme audio".to_string());
        }
        found
    }

    /// Every found image with its slot, in output order.
    pub fn images(&self) -> Vec<(AssetSlot, &Path)> {
        let mut images = Vec::new();
        if let Some(icon) = &self.icon {
            images.push((AssetSlot::Icon, icon.as_path()));
        }
        if let Some(background) = &self.background {
            images.push((AssetSlot::Background, background.as_path()));
        }
        for (i, screen) in self.screens.iter().enumerate() {
            images.push((AssetSlot::Screenshot(i), screen.as_path()));
        }
        images
    }

    /// A job that reproduces this folder from its own files.
    pub fn into_job(self) -> MediaJob {
        MediaJob {
            icon: self.icon,
            background: self.background,
            screens: self.screens,
            effect: self.effect,
            theme: self.theme,
        }
    }
}

/// Scan `<game_dir>/meta`.
pub fn inspect(game_dir: &Path) -> Result<Inventory, InventoryError> {
    let meta_dir = game_dir.join(META_DIR);
    if !meta_dir.is_dir() {
        return Err(InventoryError::NoMetaDir(game_dir.to_path_buf()));
    }

    let existing = |slot: AssetSlot| {
        let path = naming::destination(&meta_dir, slot);
        path.is_file().then_some(path)
    };

    let screens: Vec<PathBuf> = (0..MAX_SCREENS)
        .map(|i| naming::destination(&meta_dir, AssetSlot::Screenshot(i)))
        .take_while(|p| p.is_file())
        .collect();
    let stray_screens = stray_screens(&meta_dir.join(SCREENS_DIR), screens.len())?;

    Ok(Inventory {
        icon: existing(AssetSlot::Icon),
        background: existing(AssetSlot::Background),
        effect: existing(AssetSlot::Audio(AudioKind::Effect)),
        theme: existing(AssetSlot::Audio(AudioKind::Theme)),
        screens,
        stray_screens,
        meta_dir,
    })
}

fn stray_screens(screens_dir: &Path, loaded: usize) -> Result<Vec<PathBuf>, InventoryError> {
    if !screens_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut stray = Vec::new();
    for entry in std::fs::read_dir(screens_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(index) = name.to_str().and_then(naming::parse_screen_index) else {
            continue;
        };
        if index >= loaded && entry.path().is_file() {
            stray.push((index, entry.path()));
        }
    }
    stray.sort();
    Ok(stray.into_iter().map(|(_, path)| path).collect())
}

/// Whether a found image has the size its slot calls for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCheck {
    pub slot: AssetSlot,
    pub path: PathBuf,
    /// `None` if the file could not be read as an image.
    pub dimensions: Option<(u32, u32)>,
    pub expected: (u32, u32),
}

impl ImageCheck {
    pub fn conforms(&self) -> bool {
        self.dimensions == Some(self.expected)
    }
}

/// Read the size of every found image and compare it to its target.
pub fn check_images(
    inventory: &Inventory,
    backend: &impl ImageBackend,
    targets: &TargetsConfig,
) -> Vec<ImageCheck> {
    inventory
        .images()
        .into_iter()
        .filter_map(|(slot, path)| {
            let class = slot.class()?;
            let dimensions = backend
                .identify(path)
                .ok()
                .map(|Dimensions { width, height }| (width, height));
            Some(ImageCheck {
                slot,
                path: path.to_path_buf(),
                dimensions,
                expected: targets.target_for(class).dimensions(),
            })
        })
        .collect()
}
