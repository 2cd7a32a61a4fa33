//! Versioned JSON snapshots of the frequency table.

use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::frequency::FrequencyTable;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub frequencies: FrequencyTable,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

/// Write `table` to `path` atomically via a sibling temp file.
pub fn save(table: &FrequencyTable, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        frequencies: table.clone(),
    };
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
    fs::rename(&tmp, path)?;
    info!(path = %path.display(), entries = table.total(), "saved frequency snapshot");
    Ok(())
}

/// Read a snapshot; a missing file yields `None`.
pub fn load(path: &Path) -> Result<Option<FrequencyTable>, SnapshotError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let header: Header = serde_json::from_slice(&raw)?;
    if header.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let snapshot: Snapshot = serde_json::from_slice(&raw)?;
    info!(
        path = %path.display(),
        saved_at = %snapshot.saved_at,
        entries = snapshot.frequencies.total(),
        "loaded frequency snapshot"
    );
    Ok(Some(snapshot.frequencies))
}
