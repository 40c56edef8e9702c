use async_trait::async_trait;
use dashmap::DashMap;
use snaplink_core::store::{decode_snapshot, encode_snapshot, Result, SnapshotStore};
use snaplink_core::LinkRecord;

/// Key the snapshot is kept under unless told otherwise.
pub const DEFAULT_KEY: &str = "shortLinks";

/// In-memory key-value store holding serialized snapshots.
///
/// The snapshot is stored as a JSON string under a single key, the same
/// shape a browser's local storage would hold, so what is read back has
/// gone through the real encode/decode path.
#[derive(Debug)]
pub struct InMemoryStore {
    storage: DashMap<String, String>,
    key: String,
}

impl InMemoryStore {
    /// Creates an empty store using [`DEFAULT_KEY`].
    pub fn new() -> Self {
        Self::with_key(DEFAULT_KEY)
    }

    /// Creates an empty store that reads and writes under `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            storage: DashMap::new(),
            key: key.into(),
        }
    }

    /// Returns the raw serialized snapshot, if one was written.
    pub fn raw(&self) -> Option<String> {
        self.storage.get(&self.key).map(|entry| entry.value().clone())
    }

    /// Overwrites the raw serialized snapshot.
    pub fn put_raw(&self, raw: impl Into<String>) {
        self.storage.insert(self.key.clone(), raw.into());
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        match self.storage.get(&self.key) {
            Some(entry) => decode_snapshot(entry.value()),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        let raw = encode_snapshot(records)?;
        self.storage.insert(self.key.clone(), raw);
        Ok(())
    }
}
