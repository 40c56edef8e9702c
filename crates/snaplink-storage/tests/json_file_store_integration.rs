use jiff::{SignedDuration, Timestamp};
use snaplink_core::{ClickEvent, LinkRecord, Shortcode, ValidityWindow};
use snaplink_storage::{JsonFileStore, SnapshotStore, StorageError};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: JsonFileStore,
}

impl Fixture {
    fn new(relative: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = JsonFileStore::new(dir.path().join(relative));
        Self { _dir: dir, store }
    }
}

fn record(code: &str, created_at: Timestamp) -> LinkRecord {
    LinkRecord::new(
        format!("https://example.com/{code}"),
        Shortcode::new_unchecked(code),
        ValidityWindow::from_minutes(30),
        created_at,
    )
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let fixture = Fixture::new("links.json");

    let records = fixture.store.load().await.unwrap();
    assert!(records.is_empty());
    assert!(!fixture.store.path().exists());
}

#[tokio::test]
async fn round_trip_preserves_order_and_clicks() {
    let fixture = Fixture::new("links.json");
    let created: Timestamp = "2026-10-16T09:30:00.5Z".parse().unwrap();

    let mut clicked = record("k3x9a", created);
    for i in 1..=3 {
        clicked.push_click(ClickEvent::new(
            created + SignedDuration::from_secs(i),
            "stats-page",
            "India",
        ));
    }
    let records = vec![
        record("zzzzz", created),
        clicked,
        record("aaaaa", created),
    ];

    fixture.store.save(&records).await.unwrap();
    let loaded = fixture.store.load().await.unwrap();

    assert_eq!(loaded, records);
    assert_eq!(loaded[1].click_count(), 3);
}

#[tokio::test]
async fn file_uses_camel_case_layout() {
    let fixture = Fixture::new("links.json");
    let created: Timestamp = "2026-10-16T09:30:00Z".parse().unwrap();

    fixture
        .store
        .save(&[record("abcde", created)])
        .await
        .unwrap();

    let raw = std::fs::read_to_string(fixture.store.path()).unwrap();
    for field in [
        "\"longUrl\"",
        "\"shortcode\"",
        "\"createdAt\"",
        "\"expiresAt\"",
        "\"clickCount\"",
        "\"clicks\"",
    ] {
        assert!(raw.contains(field), "missing {field} in {raw}");
    }
    assert!(raw.contains("\"2026-10-16T10:00:00Z\""));
}

#[tokio::test]
async fn save_creates_parent_directories() {
    let fixture = Fixture::new("nested/deeper/links.json");
    let created = Timestamp::from_second(1_800_000_000).unwrap();

    fixture
        .store
        .save(&[record("aaaaa", created)])
        .await
        .unwrap();

    assert_eq!(fixture.store.load().await.unwrap().len(), 1);
}

#[tokio::test]
async fn save_overwrites_whole_snapshot() {
    let fixture = Fixture::new("links.json");
    let created = Timestamp::from_second(1_800_000_000).unwrap();

    fixture
        .store
        .save(&[record("aaaaa", created), record("bbbbb", created)])
        .await
        .unwrap();
    fixture
        .store
        .save(&[record("ccccc", created)])
        .await
        .unwrap();

    let loaded = fixture.store.load().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].shortcode().as_str(), "ccccc");
}

#[tokio::test]
async fn empty_file_loads_empty() {
    let fixture = Fixture::new("links.json");
    std::fs::write(fixture.store.path(), "").unwrap();

    assert!(fixture.store.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_invalid_data() {
    let fixture = Fixture::new("links.json");
    std::fs::write(fixture.store.path(), "{\"longUrl\":").unwrap();

    let err = fixture.store.load().await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidData(_)));
}
