//! Out-of-band capture of the config directory listing
//!
//! `/etc/wireguard` is normally root-only, so the listing is taken once
//! through the elevation helper and saved in the [`InterfaceStore`]. Later
//! refreshes read the saved list without prompting.

use super::directory::strip_suffix;
use super::{normalize, InterfaceStore};
use crate::platform::Elevator;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to list {dir}: {detail}")]
    ListFailed { dir: String, detail: String },
    #[error("Failed to save interface list: {0}")]
    SaveFailed(#[from] io::Error),
}

/// Interface names from `ls` output, keeping only entries with `suffix`
pub fn parse_listing(output: &str, suffix: &str) -> Vec<String> {
    normalize(
        output
            .split_whitespace()
            .filter_map(|entry| strip_suffix(entry, suffix))
            .map(str::to_string),
    )
}

/// List `dir` with elevation, persist the names and return them
pub fn capture_listing(
    elevator: &Elevator,
    dir: &Path,
    suffix: &str,
    store: &InterfaceStore,
) -> Result<Vec<String>, CaptureError> {
    let dir_str = dir.to_string_lossy().to_string();
    info!("Capturing interface list from {}", dir_str);

    let output = elevator
        .command("ls", [dir_str.as_str()])
        .output()
        .map_err(|e| CaptureError::ListFailed {
            dir: dir_str.clone(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CaptureError::ListFailed {
            dir: dir_str,
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let names = parse_listing(&String::from_utf8_lossy(&output.stdout), suffix);
    store.save(&names)?;
    info!("Captured {} interface(s)", names.len());
    Ok(names)
}
