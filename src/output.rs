//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Build progress
//!
//! ```text
//! Processing icon...
//! [ 16%] icon: composite
//! Processing screenshot 1...
//! [ 33%] screenshot 1: direct fit
//! Processing completed!
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Output: game/meta
//! 001 icon → icon.jpg: composite
//!     Source: art/logo.png
//! 002 background → background.jpg: FAILED failed to decode art/bg.psd: ...
//!     Source: art/bg.psd
//!
//! 5 of 6 items done, 1 failed
//! ```
//!
//! ## Inspect
//!
//! ```text
//! Meta: game/meta
//! Found: icon, background, 2 screenshots, theme audio
//!     icon.jpg: 512x512
//!     background.jpg: 1280x720 (expected 1920x1080)
//!     screens/screen0.jpg: 1920x1080
//!     screens/screen1.jpg: unreadable
//! Stray: screens/screen3.jpg
//! ```

use crate::inventory::{ImageCheck, Inventory};
use crate::process::{BatchReport, ItemStatus, ProcessEvent};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Show `path` relative to `base` when it lives inside it.
fn relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn status_text(status: &ItemStatus) -> String {
    match status {
        ItemStatus::Normalized { strategy } => strategy.to_string(),
        ItemStatus::Copied => "copied".to_string(),
        ItemStatus::Unchanged => "unchanged".to_string(),
        ItemStatus::Failed { reason } => format!("FAILED {reason}"),
        ItemStatus::Cancelled => "cancelled".to_string(),
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { slot } => vec![slot.status_text()],
        ProcessEvent::Finished {
            slot,
            status,
            percent,
        } => vec![format!(
            "[{:>3}%] {}: {}",
            percent,
            slot.label(),
            status_text(status)
        )],
        ProcessEvent::Completed { cancelled: false } => vec!["Processing completed!".to_string()],
        ProcessEvent::Completed { cancelled: true } => vec!["Processing cancelled.".to_string()],
    }
}

/// Format the per-item summary of a finished batch.
pub fn format_report(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!("Output: {}", report.meta_dir.display())];
    for (i, item) in report.items.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}: {}",
            format_index(i + 1),
            item.slot.label(),
            relative(&report.meta_dir, &item.dest),
            status_text(&item.status)
        ));
        lines.push(format!("    Source: {}", item.source.display()));
    }

    let failed = report.failed().count();
    let skipped = report.skipped();
    let mut summary = format!("{} of {} items done", report.succeeded(), report.items.len());
    if failed > 0 {
        summary.push_str(&format!(", {failed} failed"));
    }
    if skipped > 0 {
        summary.push_str(&format!(", {skipped} skipped"));
    }
    lines.push(String::new());
    lines.push(summary);
    lines
}

/// Print a progress event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Print a batch summary to stdout.
pub fn print_report(report: &BatchReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Format an inventory with the size check of each image.
pub fn format_inventory(inventory: &Inventory, checks: &[ImageCheck]) -> Vec<String> {
    let meta = &inventory.meta_dir;
    let mut lines = vec![format!("Meta: {}", meta.display())];

    if inventory.is_empty() {
        lines.push("No media files found.".to_string());
    } else {
        lines.push(format!("Found: {}", inventory.found().join(", ")));
    }

    for check in checks {
        let size = match check.dimensions {
            Some((w, h)) if check.conforms() => format!("{w}x{h}"),
            Some((w, h)) => format!(
                "{w}x{h} (expected {}x{})",
                check.expected.0, check.expected.1
            ),
            None => "unreadable".to_string(),
        };
        lines.push(format!("    {}: {}", relative(meta, &check.path), size));
    }

    for audio in [&inventory.effect, &inventory.theme].into_iter().flatten() {
        lines.push(format!("    {}", relative(meta, audio)));
    }

    if !inventory.stray_screens.is_empty() {
        let stray: Vec<String> = inventory
            .stray_screens
            .iter()
            .map(|p| relative(meta, p))
            .collect();
        lines.push(format!("Stray: {}", stray.join(", ")));
    }
    lines
}

/// Print an inventory to stdout.
pub fn print_inventory(inventory: &Inventory, checks: &[ImageCheck]) {
    for line in format_inventory(inventory, checks) {
        println!("{}", line);
    }
}

/// One-line result of a single `normalize` command.
pub fn format_normalized(dest: &Path, target: &str, strategy: &str) -> String {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dest.display().to_string());
    format!("{name}: {target} ({strategy})")
}
