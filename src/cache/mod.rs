//! Debounced draft persistence.
//!
//! Keeps a best-effort durable copy of the document and author name in a
//! [`Store`]. Changes restart a quiet-period timer and only the final state
//! of a burst is written. Failures are logged and otherwise ignored: the
//! in-memory document stays authoritative.

mod debounce;
mod snapshot;

pub use debounce::Debouncer;
pub use snapshot::{DraftSnapshot, Hydration, decode_snapshot};

use crate::store::Store;

/// Store key for the draft when the caller does not supply one.
pub const DEFAULT_DRAFT_KEY: &str = "tagpad.draft";
/// Store key for the persisted auto-load preference.
pub const AUTOLOAD_KEY: &str = "tagpad.autoload";
/// Quiet period before a pending draft is written.
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingDraft {
    code: String,
    name: String,
}

/// Draft cache for one editor instance.
///
/// Owns the pending-write timer. Dropping the cache cancels any write that
/// has not fired yet.
#[derive(Debug)]
pub struct DraftCache {
    key: String,
    debouncer: Debouncer<PendingDraft>,
}

impl DraftCache {
    pub fn new(key: impl Into<String>, quiet_period_ms: u64) -> Self {
        Self {
            key: key.into(),
            debouncer: Debouncer::new(quiet_period_ms),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and validate the stored draft. Never fails.
    pub fn load(&self, store: &impl Store) -> Hydration {
        match store.get(&self.key) {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => Hydration::UseDefaults,
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "draft read failed; using defaults");
                Hydration::UseDefaults
            }
        }
    }

    /// Record a change and restart the quiet period.
    pub fn schedule(&mut self, code: impl Into<String>, name: impl Into<String>, now_ms: u64) {
        let pending = PendingDraft {
            code: code.into(),
            name: name.into(),
        };
        self.debouncer.queue(pending, now_ms);
    }

    /// Write the pending draft if its quiet period has elapsed.
    ///
    /// Returns `true` when a snapshot was written.
    pub fn poll(&mut self, store: &mut impl Store, now_ms: u64) -> bool {
        match self.debouncer.take_ready(now_ms) {
            Some(pending) => self.write(store, &pending.code, &pending.name),
            None => false,
        }
    }

    /// Write immediately, bypassing and cancelling any pending write.
    pub fn save_now(&mut self, store: &mut impl Store, code: &str, name: &str) -> bool {
        self.debouncer.cancel();
        self.write(store, code, name)
    }

    /// Write the pending draft now, if there is one.
    pub fn flush(&mut self, store: &mut impl Store) -> bool {
        match self.debouncer.flush() {
            Some(pending) => self.write(store, &pending.code, &pending.name),
            None => false,
        }
    }

    /// Drop the pending write. Returns `true` if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.debouncer.cancel()
    }

    pub const fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Milliseconds until the pending write fires.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.debouncer.remaining_ms(now_ms)
    }

    fn write(&self, store: &mut impl Store, code: &str, name: &str) -> bool {
        let snapshot = DraftSnapshot::now(code, name);
        let encoded = match snapshot.encode() {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "draft encode failed");
                return false;
            }
        };
        match store.set(&self.key, &encoded) {
            Ok(()) => {
                tracing::debug!(key = %self.key, bytes = encoded.len(), "draft saved");
                true
            }
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "draft write failed");
                false
            }
        }
    }
}

impl Drop for DraftCache {
    fn drop(&mut self) {
        if self.debouncer.cancel() {
            tracing::debug!(key = %self.key, "pending draft write cancelled on teardown");
        }
    }
}

/// Stored auto-load preference, or `default` when none was saved.
pub fn load_auto_load(store: &impl Store, default: bool) -> bool {
    match store.get(AUTOLOAD_KEY) {
        Ok(Some(raw)) => match raw.trim() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        Ok(None) => default,
        Err(err) => {
            tracing::warn!(%err, "auto-load preference read failed");
            default
        }
    }
}

/// Persist the auto-load preference.
pub fn save_auto_load(store: &mut impl Store, enabled: bool) {
    let value = if enabled { "true" } else { "false" };
    if let Err(err) = store.set(AUTOLOAD_KEY, value) {
        tracing::warn!(%err, "auto-load preference write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};

    /// Store that counts writes and can be told to fail.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryStore,
        writes: Vec<(String, String)>,
        fail: bool,
    }

    impl Store for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("disabled".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("quota exceeded".to_string()));
            }
            self.writes.push((key.to_string(), value.to_string()));
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn stored(store: &RecordingStore, key: &str) -> DraftSnapshot {
        let raw = store.inner.get(key).unwrap().unwrap();
        let Hydration::Restored(snapshot) = decode_snapshot(&raw) else {
            panic!("stored draft should decode");
        };
        snapshot
    }

    #[test]
    fn test_burst_of_changes_writes_once_with_final_state() {
        let mut store = RecordingStore::default();
        let mut cache = DraftCache::new(DEFAULT_DRAFT_KEY, 300);
        for (i, text) in ["<", "<p", "<p>", "<p>h", "<p>hi"].iter().enumerate() {
            cache.schedule(*text, "Ada", i as u64 * 100);
            assert!(!cache.poll(&mut store, i as u64 * 100 + 50));
        }
        assert!(store.writes.is_empty());
        assert!(cache.poll(&mut store, 400 + 300));
        assert_eq!(store.writes.len(), 1);
        let snapshot = stored(&store, DEFAULT_DRAFT_KEY);
        assert_eq!(snapshot.code, "<p>hi");
        assert_eq!(snapshot.name, "Ada");
        assert!(snapshot.saved_at.is_some());
        assert!(!cache.poll(&mut store, 5_000));
        assert_eq!(store.writes.len(), 1);
    }

    #[test]
    fn test_save_now_bypasses_and_cancels_pending() {
        let mut store = RecordingStore::default();
        let mut cache = DraftCache::new("custom", 300);
        cache.schedule("stale", "", 0);
        assert!(cache.save_now(&mut store, "fresh", "Bo"));
        assert!(!cache.is_pending());
        assert!(!cache.poll(&mut store, 1_000));
        assert_eq!(store.writes.len(), 1);
        assert_eq!(stored(&store, "custom").code, "fresh");
    }

    #[test]
    fn test_flush_writes_pending_immediately() {
        let mut store = RecordingStore::default();
        let mut cache = DraftCache::new(DEFAULT_DRAFT_KEY, 300);
        assert!(!cache.flush(&mut store));
        cache.schedule("x", "", 0);
        assert!(cache.flush(&mut store));
        assert_eq!(stored(&store, DEFAULT_DRAFT_KEY).code, "x");
    }

    #[test]
    fn test_cancel_prevents_write() {
        let mut store = RecordingStore::default();
        let mut cache = DraftCache::new(DEFAULT_DRAFT_KEY, 300);
        cache.schedule("x", "", 0);
        assert!(cache.cancel());
        assert!(!cache.poll(&mut store, 1_000));
        assert!(store.writes.is_empty());
    }

    #[test]
    fn test_load_round_trips_saved_snapshot() {
        let mut store = RecordingStore::default();
        let mut cache = DraftCache::new(DEFAULT_DRAFT_KEY, 300);
        cache.save_now(&mut store, "<b>x</b>", "Cy");
        let Hydration::Restored(snapshot) = cache.load(&store) else {
            panic!("expected a restored draft");
        };
        assert_eq!(snapshot.code, "<b>x</b>");
        assert_eq!(snapshot.name, "Cy");
    }

    #[test]
    fn test_load_missing_or_corrupt_uses_defaults() {
        let mut store = RecordingStore::default();
        let cache = DraftCache::new(DEFAULT_DRAFT_KEY, 300);
        assert_eq!(cache.load(&store), Hydration::UseDefaults);
        store.inner.set(DEFAULT_DRAFT_KEY, "{broken").unwrap();
        assert_eq!(cache.load(&store), Hydration::UseDefaults);
    }

    #[test]
    fn test_store_failures_are_swallowed() {
        let mut store = RecordingStore {
            fail: true,
            ..RecordingStore::default()
        };
        let mut cache = DraftCache::new(DEFAULT_DRAFT_KEY, 0);
        assert_eq!(cache.load(&store), Hydration::UseDefaults);
        cache.schedule("x", "", 0);
        assert!(!cache.poll(&mut store, 0));
        assert!(!cache.save_now(&mut store, "y", ""));
        assert!(!cache.is_pending());
    }

    #[test]
    fn test_auto_load_preference() {
        let mut store = MemoryStore::new();
        assert!(load_auto_load(&store, true));
        assert!(!load_auto_load(&store, false));
        save_auto_load(&mut store, false);
        assert!(!load_auto_load(&store, true));
        save_auto_load(&mut store, true);
        assert!(load_auto_load(&store, false));
        store.set(AUTOLOAD_KEY, "maybe").unwrap();
        assert!(load_auto_load(&store, true));
    }
}
