use crate::error::RegistryError;
use crate::notifier::NotifierHandle;
use jiff::Timestamp;
use snaplink_core::{
    ClickEvent, Clock, LinkRecord, LinkRef, Shortcode, SnapshotStore, StorageError, SystemClock,
    TimeRemaining, ValidityWindow,
};
use std::collections::HashSet;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, trace, warn};

pub type Result<T> = std::result::Result<T, RegistryError>;

/// A link waiting to be committed to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub long_url: String,
    pub shortcode: Shortcode,
    pub validity: ValidityWindow,
}

impl NewLink {
    pub fn new(
        long_url: impl Into<String>,
        shortcode: Shortcode,
        validity: ValidityWindow,
    ) -> Self {
        Self {
            long_url: long_url.into(),
            shortcode,
            validity,
        }
    }
}

/// Owns the canonical, ordered collection of link records.
///
/// The collection is read from the store once in [`LinkRegistry::load`]
/// and the whole snapshot is written back after every mutation. The lock
/// is held across the write, so mutations apply one at a time and a
/// failed write leaves the in-memory state as it was.
#[derive(Debug)]
pub struct LinkRegistry<S, C = SystemClock> {
    store: S,
    clock: C,
    notifier: NotifierHandle,
    records: Mutex<Vec<LinkRecord>>,
}

impl<S: SnapshotStore, C: Clock> LinkRegistry<S, C> {
    /// Builds a registry from the store's current snapshot.
    pub async fn load(store: S, clock: C, notifier: NotifierHandle) -> Result<Self> {
        let mut records = store.load().await?;
        let mut seen = HashSet::with_capacity(records.len());
        for record in &mut records {
            if !seen.insert(record.shortcode().clone()) {
                return Err(StorageError::InvalidData(format!(
                    "duplicate shortcode {} in stored snapshot",
                    record.shortcode()
                ))
                .into());
            }
            if record.expires_at() <= record.created_at() {
                return Err(StorageError::InvalidData(format!(
                    "shortcode {} expires at or before its creation time",
                    record.shortcode()
                ))
                .into());
            }
            if record.reconcile_click_count() {
                warn!(
                    code = %record.shortcode(),
                    clicks = record.clicks().len(),
                    "stored click count disagreed with click log, using the log"
                );
            }
        }
        debug!(records = records.len(), "link registry loaded");

        Ok(Self {
            store,
            clock,
            notifier,
            records: Mutex::new(records),
        })
    }

    /// Current time according to the registry's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Inserts a single link created now.
    pub async fn insert(
        &self,
        long_url: impl Into<String>,
        shortcode: Shortcode,
        validity: ValidityWindow,
    ) -> Result<LinkRecord> {
        let mut records = self.lock().await;
        let record = LinkRecord::new(long_url, shortcode, validity, self.clock.now());
        self.append_locked(&mut records, vec![record.clone()]).await?;
        Ok(record)
    }

    /// Appends every link in one update, all stamped with the same
    /// creation time. Either all of them are committed or none are.
    pub async fn commit(&self, links: Vec<NewLink>) -> Result<Vec<LinkRecord>> {
        let mut records = self.lock().await;
        self.commit_locked(&mut records, links).await
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Vec<LinkRecord>> {
        self.records.lock().await
    }

    /// Commit path for callers already holding the registry lock.
    pub(crate) async fn commit_locked(
        &self,
        records: &mut Vec<LinkRecord>,
        links: Vec<NewLink>,
    ) -> Result<Vec<LinkRecord>> {
        if links.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let created: Vec<LinkRecord> = links
            .into_iter()
            .map(|link| LinkRecord::new(link.long_url, link.shortcode, link.validity, now))
            .collect();
        self.append_locked(records, created.clone()).await?;
        Ok(created)
    }

    async fn append_locked(
        &self,
        records: &mut Vec<LinkRecord>,
        created: Vec<LinkRecord>,
    ) -> Result<()> {
        {
            let mut taken: HashSet<&Shortcode> = records.iter().map(|r| r.shortcode()).collect();
            if let Some(dup) = created.iter().find(|r| !taken.insert(r.shortcode())) {
                return Err(RegistryError::DuplicateShortcode(dup.shortcode().to_string()));
            }
        }

        let previous_len = records.len();
        for record in &created {
            debug!(code = %record.shortcode(), expires_at = %record.expires_at(), "link staged");
        }
        records.extend(created);

        if let Err(err) = self.store.save(records).await {
            records.truncate(previous_len);
            warn!(error = %err, "failed to persist new links, rolled back");
            return Err(err.into());
        }
        Ok(())
    }

    /// Records one click against `target` and persists it.
    ///
    /// A notification describing the click is emitted after the write; its
    /// delivery has no bearing on the result.
    pub async fn record_click(
        &self,
        target: impl Into<LinkRef>,
        source: &str,
        geo: &str,
    ) -> Result<ClickEvent> {
        let target = target.into();
        let mut records = self.lock().await;
        let index =
            position(&records, &target).ok_or_else(|| RegistryError::NotFound(target.to_string()))?;

        let event = ClickEvent::new(self.clock.now(), source, geo);
        let before = records[index].clone();
        records[index].push_click(event.clone());

        if let Err(err) = self.store.save(&records).await {
            records[index] = before;
            warn!(error = %err, target = %target, "failed to persist click, rolled back");
            return Err(err.into());
        }

        let code = records[index].shortcode().clone();
        let clicks = records[index].click_count();
        drop(records);

        info!(code = %code, clicks, source, "click recorded");
        self.notifier.info(format!("Link clicked: {code}"));
        Ok(event)
    }

    /// All records in insertion order.
    pub async fn records(&self) -> Vec<LinkRecord> {
        self.lock().await.clone()
    }

    pub async fn get(&self, target: impl Into<LinkRef>) -> Option<LinkRecord> {
        let target = target.into();
        let records = self.lock().await;
        position(&records, &target).map(|index| records[index].clone())
    }

    pub async fn contains(&self, code: &Shortcode) -> bool {
        self.lock().await.iter().any(|r| r.shortcode() == code)
    }

    /// Every code in use, for use as a generator exclusion set.
    pub async fn codes(&self) -> HashSet<Shortcode> {
        self.lock()
            .await
            .iter()
            .map(|r| r.shortcode().clone())
            .collect()
    }

    /// Records that have not expired at `now`, in insertion order.
    pub async fn active_records(&self, now: Timestamp) -> Vec<LinkRecord> {
        let records = self.lock().await;
        let active: Vec<LinkRecord> = records
            .iter()
            .filter(|r| !is_expired(r, now))
            .cloned()
            .collect();
        trace!(total = records.len(), active = active.len(), "filtered active links");
        active
    }

    pub async fn len(&self) -> usize {
        self.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lock().await.is_empty()
    }
}

fn position(records: &[LinkRecord], target: &LinkRef) -> Option<usize> {
    match target {
        LinkRef::Index(index) => (*index < records.len()).then_some(*index),
        LinkRef::Code(code) => records.iter().position(|r| r.shortcode() == code),
    }
}

/// `true` once `now` has reached the record's expiry time.
pub fn is_expired(record: &LinkRecord, now: Timestamp) -> bool {
    record.is_expired(now)
}

/// Time left until the record expires, or [`TimeRemaining::Expired`].
pub fn time_remaining(record: &LinkRecord, now: Timestamp) -> TimeRemaining {
    record.time_remaining(now)
}
