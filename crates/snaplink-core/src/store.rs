use crate::error::StorageError;
use crate::link::LinkRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for snapshot store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Whole-snapshot persistence for the link registry.
///
/// The registry reads the full state once at startup and writes the full
/// state after every mutation; there are no partial writes.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    /// Loads every stored record in order. A missing or empty store yields
    /// an empty sequence.
    async fn load(&self) -> Result<Vec<LinkRecord>>;

    /// Replaces the stored snapshot with `records`.
    async fn save(&self, records: &[LinkRecord]) -> Result<()>;
}

#[async_trait]
impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        (**self).load().await
    }

    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        (**self).save(records).await
    }
}

/// Decodes a serialized snapshot. Blank input decodes to no records.
pub fn decode_snapshot(raw: &str) -> Result<Vec<LinkRecord>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| StorageError::InvalidData(e.to_string()))
}

pub fn encode_snapshot(records: &[LinkRecord]) -> Result<String> {
    serde_json::to_string(records).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{ClickEvent, ValidityWindow};
    use crate::shortcode::Shortcode;
    use jiff::Timestamp;

    #[test]
    fn blank_snapshot_is_empty() {
        assert!(decode_snapshot("").unwrap().is_empty());
        assert!(decode_snapshot("  \n").unwrap().is_empty());
        assert!(decode_snapshot("[]").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_invalid_data() {
        assert!(matches!(
            decode_snapshot("{not json"),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn snapshot_preserves_order_and_clicks() {
        let created: Timestamp = "2026-03-01T12:00:00.123456789Z".parse().unwrap();
        let mut first = LinkRecord::new(
            "https://example.com/a",
            Shortcode::new_unchecked("aaaaa"),
            ValidityWindow::default(),
            created,
        );
        first.push_click(ClickEvent::new(created, "stats-page", "India"));
        let second = LinkRecord::new(
            "https://example.com/b",
            Shortcode::new_unchecked("bbbbb"),
            ValidityWindow::from_minutes(5),
            created,
        );
        let records = vec![first, second];

        let raw = encode_snapshot(&records).unwrap();
        assert_eq!(decode_snapshot(&raw).unwrap(), records);
    }
}
