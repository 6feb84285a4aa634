//! Shared types used by the batch driver, the inventory and the CLI.
//!
//! A game's media set is a handful of fixed slots: one icon, one background,
//! an ordered list of screenshots and two optional audio clips. Images go
//! through the normalization engine; audio is copied verbatim.

use crate::imaging::TargetSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The kind of image an output slot holds. Each class has its own target size.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Icon,
    Background,
    Screenshot,
}

impl AssetClass {
    /// Built-in target size: 512x512 for icons, 1920x1080 otherwise.
    pub fn default_target(self) -> TargetSpec {
        match self {
            AssetClass::Icon => TargetSpec::icon(),
            AssetClass::Background | AssetClass::Screenshot => TargetSpec::widescreen(),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetClass::Icon => "icon",
            AssetClass::Background => "background",
            AssetClass::Screenshot => "screenshot",
        })
    }
}

/// Audio clips that ride along with the images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioKind {
    Effect,
    Theme,
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AudioKind::Effect => "effect",
            AudioKind::Theme => "theme",
        })
    }
}

/// One output slot in the `meta/` folder.
///
/// Screenshot indices are 0-based, matching the `screen{N}.jpg` file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    Icon,
    Background,
    Screenshot(usize),
    Audio(AudioKind),
}

impl AssetSlot {
    /// Image class of this slot, `None` for audio.
    pub fn class(self) -> Option<AssetClass> {
        match self {
            AssetSlot::Icon => Some(AssetClass::Icon),
            AssetSlot::Background => Some(AssetClass::Background),
            AssetSlot::Screenshot(_) => Some(AssetClass::Screenshot),
            AssetSlot::Audio(_) => None,
        }
    }

    /// Short human label: `icon`, `screenshot 3`, `theme audio`.
    ///
    /// Screenshots are numbered from 1 for display.
    pub fn label(self) -> String {
        match self {
            AssetSlot::Icon => "icon".to_string(),
            AssetSlot::Background => "background".to_string(),
            AssetSlot::Screenshot(i) => format!("screenshot {}", i + 1),
            AssetSlot::Audio(kind) => format!("{kind} audio"),
        }
    }

    /// Status line announced when work on this slot begins.
    pub fn status_text(self) -> String {
        format!("Processing {}...", self.label())
    }
}

/// One image to normalize: the `(source, target, destination)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub slot: AssetSlot,
    pub source: PathBuf,
    pub target: TargetSpec,
    pub dest: PathBuf,
}

/// One audio file to copy into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyItem {
    pub kind: AudioKind,
    pub source: PathBuf,
    pub dest: PathBuf,
}
