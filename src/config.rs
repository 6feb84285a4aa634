//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml` files. Stock
//! defaults are overridden by whatever a user file specifies.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [targets]
//! icon = [512, 512]          # width, height
//! background = [1920, 1080]
//! screenshot = [1920, 1080]
//!
//! [processing]
//! max_processes = 4          # Max parallel workers (omit for auto = CPU cores)
//! fail_fast = false          # Abandon queued items after the first failure
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.
//!
//! The compositing constants (ratio threshold, blur radii, darken factor,
//! shadow shape, JPEG quality) are fixed and not part of the config.

use crate::imaging::TargetSpec;
use crate::types::AssetClass;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaConfig {
    /// Output size per asset class.
    pub targets: TargetsConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl MetaConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, [width, height]) in [
            ("icon", self.targets.icon),
            ("background", self.targets.background),
            ("screenshot", self.targets.screenshot),
        ] {
            if width == 0 || height == 0 {
                return Err(ConfigError::Validation(format!(
                    "targets.{name} must have non-zero width and height, got [{width}, {height}]"
                )));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output sizes as `[width, height]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsConfig {
    pub icon: [u32; 2],
    pub background: [u32; 2],
    pub screenshot: [u32; 2],
}

impl Default for TargetsConfig {
    fn default() -> Self {
        let pair = |class: AssetClass| {
            let target = class.default_target();
            [target.width, target.height]
        };
        Self {
            icon: pair(AssetClass::Icon),
            background: pair(AssetClass::Background),
            screenshot: pair(AssetClass::Screenshot),
        }
    }
}

impl TargetsConfig {
    /// Target size for an asset class.
    ///
    /// Assumes the config passed [`MetaConfig::validate`].
    pub fn target_for(&self, class: AssetClass) -> TargetSpec {
        let [width, height] = match class {
            AssetClass::Icon => self.icon,
            AssetClass::Background => self.background,
            AssetClass::Screenshot => self.screenshot,
        };
        TargetSpec { width, height }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Stop starting new items once one has failed.
    pub fail_fast: bool,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(MetaConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<MetaConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MetaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, merged over stock defaults.
///
/// The file must exist; pass no path at all to get the defaults.
pub fn load_config(path: &Path) -> Result<MetaConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(overlay))
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# metacanvas configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.

# ---------------------------------------------------------------------------
# Output sizes, as [width, height] in pixels.
# Sources whose aspect ratio is within 0.1 of the target are scaled and
# center-cropped. Others are placed over a blurred, darkened fill of
# themselves.
# ---------------------------------------------------------------------------
[targets]
icon = [512, 512]
background = [1920, 1080]
screenshot = [1920, 1080]

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel workers.
# Omit to auto-detect (uses all CPU cores).
# Values above the core count are clamped down.
# max_processes = 4

# Stop starting new items once one has failed. Items already running
# finish normally.
fail_fast = false
"##
}
