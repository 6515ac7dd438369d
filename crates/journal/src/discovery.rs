use crate::error::JournalError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Finds the most recent trade log in `dir`.
///
/// The trading process names its logs so that they sort chronologically, so the
/// lexicographically last `*.csv` file wins. Returns `Ok(None)` when the
/// directory does not exist or holds no logs.
pub fn latest_log(dir: &Path) -> Result<Option<PathBuf>, JournalError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "Log directory does not exist.");
            return Ok(None);
        }
        Err(source) => {
            return Err(JournalError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut logs = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| JournalError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            logs.push(path);
        }
    }

    logs.sort();
    Ok(logs.pop())
}
