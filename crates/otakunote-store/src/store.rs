use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use otakunote_models::{MediaMetadata, MediaType, WatchStatus, WatchlistEntry};

use crate::bus::{WatchlistBus, WatchlistUpdate};
use crate::storage::WatchlistStorage;

/// Storage key the original app used in localStorage.
pub const WATCHLIST_KEY: &str = "otakunote-watchlist";

/// Per-status entry counts, used for the watchlist tab badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub watching: usize,
    pub completed: usize,
    pub plan_to_watch: usize,
    pub dropped: usize,
}

impl StatusCounts {
    pub fn get(&self, status: WatchStatus) -> usize {
        match status {
            WatchStatus::Watching => self.watching,
            WatchStatus::Completed => self.completed,
            WatchStatus::PlanToWatch => self.plan_to_watch,
            WatchStatus::Dropped => self.dropped,
        }
    }

    pub fn total(&self) -> usize {
        self.watching + self.completed + self.plan_to_watch + self.dropped
    }
}

/// Single source of truth for the watchlist collection.
///
/// Every mutation is written through to storage before it is considered
/// applied; storage failures are logged and swallowed so a full disk or
/// read-only data dir degrades to a session-only watchlist instead of an
/// error in the caller's face. Membership changes (add/remove) go out on
/// the bus as `(id, added)`; status and progress changes go out on the
/// update channel.
pub struct WatchlistStore {
    storage: Box<dyn WatchlistStorage>,
    key: String,
    bus: Arc<WatchlistBus>,
    entries: Vec<WatchlistEntry>,
}

impl WatchlistStore {
    pub fn new(storage: Box<dyn WatchlistStorage>, bus: Arc<WatchlistBus>) -> Self {
        Self::with_key(storage, bus, WATCHLIST_KEY)
    }

    pub fn with_key(
        storage: Box<dyn WatchlistStorage>,
        bus: Arc<WatchlistBus>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let entries = hydrate(storage.as_ref(), &key);
        Self {
            storage,
            key,
            bus,
            entries,
        }
    }

    pub fn bus(&self) -> &Arc<WatchlistBus> {
        &self.bus
    }

    /// Add a title to the watchlist. New entries start as `plan_to_watch`
    /// with zero watched episodes and broadcast `(id, true)`. Adding an id
    /// that is already present only refreshes the cached metadata (when
    /// supplied) and broadcasts nothing. Returns true if an entry was
    /// created.
    pub fn add(
        &mut self,
        id: &str,
        media_type: MediaType,
        metadata: Option<MediaMetadata>,
    ) -> bool {
        if id.trim().is_empty() {
            warn!("ignoring add with empty id");
            return false;
        }

        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == id) {
            if let Some(metadata) = metadata {
                // Whole-record replace; a sparse refresh overwrites a fuller
                // snapshot rather than merging field by field.
                existing.cached_metadata = Some(metadata);
                self.persist();
            }
            return false;
        }

        self.entries
            .push(WatchlistEntry::new(id, media_type, metadata));
        self.persist();
        self.bus.publish(id, true);
        true
    }

    /// Remove a title. Idempotent: removing an absent id changes nothing
    /// and broadcasts nothing. Returns true if an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return false;
        }
        self.persist();
        self.bus.publish(id, false);
        true
    }

    /// Set the status of an existing entry. Any transition is allowed.
    /// No-op for absent ids. Returns true if an entry was updated.
    pub fn update_status(&mut self, id: &str, status: WatchStatus) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.status = status;
        self.persist();
        self.bus.publish_update(&WatchlistUpdate::Status {
            id: id.to_string(),
            status,
        });
        true
    }

    /// Set the watched-episode count of an existing entry. Negative counts
    /// are unrepresentable here; callers taking signed user input must
    /// reject it at their own boundary.
    pub fn update_watched_episodes(&mut self, id: &str, watched_episodes: u32) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.watched_episodes = watched_episodes;
        self.persist();
        self.bus.publish_update(&WatchlistUpdate::Progress {
            id: id.to_string(),
            watched_episodes,
        });
        true
    }

    /// Replace the cached metadata snapshot of an existing entry without
    /// touching status, progress, or addedAt. Used by the refresh flow
    /// after a catalog fetch. No broadcast.
    pub fn set_metadata(&mut self, id: &str, metadata: MediaMetadata) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.cached_metadata = Some(metadata);
        self.persist();
        true
    }

    /// Drop every entry. Broadcasts `(id, false)` for each removed title.
    pub fn clear(&mut self) {
        let removed: Vec<String> = self.entries.drain(..).map(|e| e.id).collect();
        if removed.is_empty() {
            return;
        }
        self.persist();
        for id in removed {
            self.bus.publish(&id, false);
        }
    }

    pub fn is_in_watchlist(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn status_of(&self, id: &str) -> Option<WatchStatus> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.status)
    }

    /// Watched episodes for an id, 0 if absent.
    pub fn watched_episodes(&self, id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.watched_episodes)
            .unwrap_or(0)
    }

    pub fn metadata(&self, id: &str) -> Option<&MediaMetadata> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.cached_metadata.as_ref())
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn entries_with_status(&self, status: WatchStatus) -> Vec<&WatchlistEntry> {
        self.entries.iter().filter(|e| e.status == status).collect()
    }

    pub fn entries_of_type(&self, media_type: MediaType) -> Vec<&WatchlistEntry> {
        self.entries
            .iter()
            .filter(|e| e.media_type == media_type)
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.entries {
            match entry.status {
                WatchStatus::Watching => counts.watching += 1,
                WatchStatus::Completed => counts.completed += 1,
                WatchStatus::PlanToWatch => counts.plan_to_watch += 1,
                WatchStatus::Dropped => counts.dropped += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of entries that have no cached metadata snapshot yet.
    pub fn ids_missing_metadata(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.cached_metadata.is_none())
            .map(|e| e.id.clone())
            .collect()
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize watchlist: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            // Keep the in-memory state; the session stays usable and the
            // next successful write self-heals the stored copy.
            warn!("failed to persist watchlist ({} entries): {}", self.entries.len(), e);
        }
    }
}

/// Load the persisted collection, treating anything malformed as empty.
/// A non-array value or unparsable JSON drops the whole collection; a bad
/// individual record is skipped so one corrupt entry cannot take the rest
/// down with it. Duplicate ids keep the first occurrence.
fn hydrate(storage: &dyn WatchlistStorage, key: &str) -> Vec<WatchlistEntry> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("failed to read watchlist from storage: {}", e);
            return Vec::new();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("stored watchlist is not valid JSON, starting empty: {}", e);
            return Vec::new();
        }
    };

    let serde_json::Value::Array(items) = value else {
        warn!("stored watchlist is not an array, starting empty");
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();
    for item in items {
        match serde_json::from_value::<WatchlistEntry>(item) {
            Ok(entry) => {
                if seen.insert(entry.id.clone()) {
                    entries.push(entry);
                } else {
                    warn!("dropping duplicate watchlist entry for id {}", entry.id);
                }
            }
            Err(e) => warn!("skipping malformed watchlist entry: {}", e),
        }
    }
    debug!("hydrated watchlist: {} entries", entries.len());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Mutex;

    fn store_on(storage: Box<dyn WatchlistStorage>) -> WatchlistStore {
        WatchlistStore::new(storage, Arc::new(WatchlistBus::new()))
    }

    fn shared_storage() -> Arc<MemoryStorage> {
        Arc::new(MemoryStorage::new())
    }

    fn sample_metadata(id: &str, english: &str) -> MediaMetadata {
        let mut meta = MediaMetadata::new(id, MediaType::Anime);
        meta.title.english = Some(english.to_string());
        meta
    }

    #[test]
    fn add_creates_entry_with_defaults() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        assert!(store.add("123", MediaType::Anime, Some(sample_metadata("123", "Foo"))));

        assert!(store.is_in_watchlist("123"));
        assert_eq!(store.status_of("123"), Some(WatchStatus::PlanToWatch));
        assert_eq!(store.watched_episodes("123"), 0);
        assert_eq!(store.metadata("123").unwrap().title.preferred(), "Foo");
    }

    #[test]
    fn add_is_unique_per_id() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("123", MediaType::Anime, None);
        store.add("123", MediaType::Anime, None);
        store.add("123", MediaType::Anime, Some(sample_metadata("123", "Foo")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeated_add_refreshes_metadata_only() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("123", MediaType::Anime, Some(sample_metadata("123", "Foo")));
        store.update_status("123", WatchStatus::Watching);
        store.update_watched_episodes("123", 5);
        let added_at = store.entries()[0].added_at;

        let created = store.add("123", MediaType::Anime, Some(sample_metadata("123", "Foo Updated")));

        assert!(!created);
        assert_eq!(store.len(), 1);
        assert_eq!(store.metadata("123").unwrap().title.preferred(), "Foo Updated");
        assert_eq!(store.status_of("123"), Some(WatchStatus::Watching));
        assert_eq!(store.watched_episodes("123"), 5);
        assert_eq!(store.entries()[0].added_at, added_at);
    }

    #[test]
    fn add_with_empty_id_is_a_noop() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        assert!(!store.add("", MediaType::Anime, None));
        assert!(!store.add("   ", MediaType::Anime, None));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("123", MediaType::Anime, None);

        assert!(store.remove("123"));
        assert!(!store.remove("123"));
        assert!(store.is_empty());
    }

    #[test]
    fn status_transitions_are_unrestricted() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("123", MediaType::Anime, None);

        for status in WatchStatus::ALL {
            assert!(store.update_status("123", status));
            assert_eq!(store.status_of("123"), Some(status));
        }
        // Backwards too: completed -> watching is legal.
        store.update_status("123", WatchStatus::Completed);
        assert!(store.update_status("123", WatchStatus::Watching));
    }

    #[test]
    fn updates_on_absent_ids_are_noops() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        assert!(!store.update_status("nope", WatchStatus::Watching));
        assert!(!store.update_watched_episodes("nope", 3));
        assert!(!store.set_metadata("nope", sample_metadata("nope", "X")));
        assert_eq!(store.watched_episodes("nope"), 0);
        assert_eq!(store.status_of("nope"), None);
    }

    #[test]
    fn round_trips_through_storage() {
        let storage = shared_storage();
        let mut store = WatchlistStore::new(Box::new(storage.clone()), Arc::new(WatchlistBus::new()));
        store.add("1", MediaType::Anime, Some(sample_metadata("1", "A")));
        store.add("2", MediaType::Manga, None);
        store.update_status("2", WatchStatus::Watching);
        store.update_watched_episodes("2", 7);
        let first = store.entries().to_vec();

        let reloaded = WatchlistStore::new(Box::new(storage), Arc::new(WatchlistBus::new()));
        assert_eq!(reloaded.entries(), first.as_slice());
    }

    #[test]
    fn corrupt_storage_behaves_as_empty() {
        for corrupt in ["{\"id\":\"1\"}", "\"not a list\"", "42", "not json at all"] {
            let storage = shared_storage();
            storage.set(WATCHLIST_KEY, corrupt).unwrap();
            let store = WatchlistStore::new(Box::new(storage), Arc::new(WatchlistBus::new()));

            assert!(!store.is_in_watchlist("1"));
            assert_eq!(store.status_of("1"), None);
            assert_eq!(store.watched_episodes("1"), 0);
            assert!(store.entries().is_empty());
        }
    }

    #[test]
    fn corrupt_storage_self_heals_on_next_mutation() {
        let storage = shared_storage();
        storage.set(WATCHLIST_KEY, "{\"oops\":true}").unwrap();

        let mut store = WatchlistStore::new(Box::new(storage.clone()), Arc::new(WatchlistBus::new()));
        store.add("5", MediaType::Anime, None);

        let raw = storage.get(WATCHLIST_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let storage = shared_storage();
        storage
            .set(
                WATCHLIST_KEY,
                r#"[
                    {"id":"1","mediaType":"ANIME","addedAt":1,"status":"watching"},
                    {"id":"2","mediaType":"ANIME","addedAt":2,"status":"on_hold"},
                    {"id":"1","mediaType":"ANIME","addedAt":3,"status":"dropped"}
                ]"#,
            )
            .unwrap();

        let store = WatchlistStore::new(Box::new(storage), Arc::new(WatchlistBus::new()));
        // Bad status dropped, duplicate id keeps the first occurrence.
        assert_eq!(store.len(), 1);
        assert_eq!(store.status_of("1"), Some(WatchStatus::Watching));
    }

    #[test]
    fn membership_notifications_fire_exactly_once() {
        let bus = Arc::new(WatchlistBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe(move |id, added| {
            sink.lock().unwrap().push((id.to_string(), added));
        });

        let mut store = WatchlistStore::new(Box::new(MemoryStorage::new()), bus);
        store.add("123", MediaType::Anime, None);
        // Metadata-only refresh: no event.
        store.add("123", MediaType::Anime, Some(sample_metadata("123", "Foo")));
        // Status change goes to the update channel, not membership.
        store.update_status("123", WatchStatus::Completed);
        store.remove("123");
        store.remove("123");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("123".to_string(), true), ("123".to_string(), false)]
        );
    }

    #[test]
    fn status_and_progress_publish_update_events() {
        let bus = Arc::new(WatchlistBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe_updates(move |update| sink.lock().unwrap().push(update.clone()));

        let mut store = WatchlistStore::new(Box::new(MemoryStorage::new()), bus);
        store.add("9", MediaType::Anime, None);
        store.update_status("9", WatchStatus::Watching);
        store.update_watched_episodes("9", 4);
        store.set_metadata("9", sample_metadata("9", "Quiet"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                WatchlistUpdate::Status {
                    id: "9".to_string(),
                    status: WatchStatus::Watching
                },
                WatchlistUpdate::Progress {
                    id: "9".to_string(),
                    watched_episodes: 4
                },
            ]
        );
    }

    #[test]
    fn filters_entries_by_status_and_type() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("1", MediaType::Anime, None);
        store.add("2", MediaType::Manga, None);
        store.add("3", MediaType::Anime, None);
        store.update_status("1", WatchStatus::Watching);
        store.update_status("2", WatchStatus::Watching);

        let watching = store.entries_with_status(WatchStatus::Watching);
        let ids: Vec<&str> = watching.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(store.entries_with_status(WatchStatus::Dropped).is_empty());

        let anime = store.entries_of_type(MediaType::Anime);
        let ids: Vec<&str> = anime.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn counts_track_statuses() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("1", MediaType::Anime, None);
        store.add("2", MediaType::Anime, None);
        store.add("3", MediaType::Manga, None);
        store.update_status("1", WatchStatus::Watching);
        store.update_status("2", WatchStatus::Completed);

        let counts = store.counts();
        assert_eq!(counts.watching, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.plan_to_watch, 1);
        assert_eq!(counts.dropped, 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(WatchStatus::Completed), 1);
    }

    #[test]
    fn storage_write_failure_keeps_session_state() {
        struct FailingStorage;
        impl WatchlistStorage for FailingStorage {
            fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
                Ok(None)
            }
            fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
                anyhow::bail!("quota exceeded")
            }
            fn remove(&self, _key: &str) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let mut store = store_on(Box::new(FailingStorage));
        store.add("123", MediaType::Anime, None);
        assert!(store.is_in_watchlist("123"));
        assert!(store.update_status("123", WatchStatus::Watching));
        assert_eq!(store.status_of("123"), Some(WatchStatus::Watching));
    }

    #[test]
    fn clear_empties_and_notifies_per_entry() {
        let bus = Arc::new(WatchlistBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = bus.subscribe(move |id, added| sink.lock().unwrap().push((id.to_string(), added)));

        let mut store = WatchlistStore::new(Box::new(MemoryStorage::new()), bus);
        store.add("1", MediaType::Anime, None);
        store.add("2", MediaType::Manga, None);
        seen.lock().unwrap().clear();

        store.clear();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("1".to_string(), false), ("2".to_string(), false)]
        );
    }

    #[test]
    fn missing_metadata_ids_are_reported() {
        let mut store = store_on(Box::new(MemoryStorage::new()));
        store.add("1", MediaType::Anime, Some(sample_metadata("1", "A")));
        store.add("2", MediaType::Anime, None);
        store.add("3", MediaType::Manga, None);

        assert_eq!(store.ids_missing_metadata(), vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = crate::storage::FileStorage::new(dir.path()).unwrap();
            let mut store = store_on(Box::new(storage));
            store.add("42", MediaType::Anime, None);
            store.update_status("42", WatchStatus::Watching);
        }
        let storage = crate::storage::FileStorage::new(dir.path()).unwrap();
        let store = store_on(Box::new(storage));
        assert_eq!(store.status_of("42"), Some(WatchStatus::Watching));
    }
}
