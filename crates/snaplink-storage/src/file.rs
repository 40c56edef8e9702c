use async_trait::async_trait;
use snaplink_core::store::{decode_snapshot, encode_snapshot, Result, SnapshotStore};
use snaplink_core::{LinkRecord, StorageError};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Keeps the snapshot as a JSON array in a single file.
///
/// Saves write a sibling `*.tmp` file and rename it over the target, so a
/// reader never sees a half-written snapshot. A missing file loads as an
/// empty registry.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn map_io_error(path: &Path, err: std::io::Error) -> StorageError {
    let message = format!("{}: {err}", path.display());
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::NotFound => StorageError::Unavailable(message),
        ErrorKind::InvalidData => StorageError::InvalidData(message),
        _ => StorageError::Operation(message),
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let records = decode_snapshot(&raw)?;
                debug!(path = %self.path.display(), records = records.len(), "loaded snapshot");
                Ok(records)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet, starting empty");
                Ok(Vec::new())
            }
            Err(err) => Err(map_io_error(&self.path, err)),
        }
    }

    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        let raw = encode_snapshot(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io_error(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, raw)
            .await
            .map_err(|e| map_io_error(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| map_io_error(&self.path, e))?;

        trace!(path = %self.path.display(), records = records.len(), "saved snapshot");
        Ok(())
    }
}
