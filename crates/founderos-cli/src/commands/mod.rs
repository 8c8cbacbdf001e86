//! Subcommand implementations.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod gmail;
pub mod setup;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::ClientResult;

/// Writes `value` as pretty JSON to `dir/file`, creating `dir` if needed.
/// An absolute `file` is used as is.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    file: &Path,
    value: &T,
) -> ClientResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(&path, json)?;
    debug!("wrote {}", path.display());
    Ok(path)
}
