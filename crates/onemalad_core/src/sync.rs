//! Bridges remote change feeds into full local snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::remote::{ChangeEvent, RemoteBackend, WatchId};
use crate::schema::{Activity, Banner, CommunityEvent, Issue, Volunteer, WardUpdate};
use crate::store::{LocalStore, Record};

pub struct SyncAdapter {
    store: Arc<LocalStore>,
    remote: Option<Arc<dyn RemoteBackend>>,
    initialized: Arc<AtomicBool>,
}

/// Open subscriptions from one successful [`SyncAdapter::init`].
/// A handle from a skipped init is inert.
#[must_use = "dropping the handle leaves the subscriptions open"]
pub struct SyncHandle {
    active: Option<ActiveSync>,
}

struct ActiveSync {
    remote: Arc<dyn RemoteBackend>,
    watches: Vec<WatchId>,
    initialized: Arc<AtomicBool>,
}

impl SyncAdapter {
    pub fn new(store: Arc<LocalStore>, remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        Self {
            store,
            remote,
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Opens one subscription per tracked collection. Without a configured
    /// backend, or when already initialized, nothing is opened.
    pub fn init(&self) -> SyncHandle {
        let Some(remote) = self.remote.clone() else {
            debug!("remote backend not configured; keeping local data");
            return SyncHandle { active: None };
        };
        if self
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already initialized");
            return SyncHandle { active: None };
        }

        self.store.set_remote_ready(true);
        let watches = vec![
            track::<Issue>(&remote, &self.store),
            track::<Activity>(&remote, &self.store),
            track::<CommunityEvent>(&remote, &self.store),
            track::<Volunteer>(&remote, &self.store),
            track::<Banner>(&remote, &self.store),
            track::<WardUpdate>(&remote, &self.store),
        ];
        info!(subscriptions = watches.len(), "remote sync started");

        SyncHandle {
            active: Some(ActiveSync {
                remote,
                watches,
                initialized: self.initialized.clone(),
            }),
        }
    }
}

impl SyncHandle {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Closes every subscription and re-arms the adapter's init guard.
    pub fn teardown(self) {
        let Some(active) = self.active else {
            return;
        };
        for watch in &active.watches {
            active.remote.unwatch(*watch);
        }
        active.initialized.store(false, Ordering::SeqCst);
        info!(subscriptions = active.watches.len(), "remote sync stopped");
    }
}

fn track<T: Record>(remote: &Arc<dyn RemoteBackend>, store: &Arc<LocalStore>) -> WatchId {
    reload::<T>(remote.as_ref(), store);

    let weak_remote: Weak<dyn RemoteBackend> = Arc::downgrade(remote);
    let store = store.clone();
    remote.watch(
        T::COLLECTION,
        Arc::new(move |event: &ChangeEvent| {
            debug!(collection = %event.collection, id = %event.id, kind = ?event.kind, "remote change");
            if let Some(remote) = weak_remote.upgrade() {
                reload::<T>(remote.as_ref(), &store);
            }
        }),
    )
}

/// Re-reads the visible result set and replaces the local collection.
/// Read failures leave the collection stale; there is no retry.
fn reload<T: Record>(remote: &dyn RemoteBackend, store: &LocalStore) {
    let docs = match remote.list(T::COLLECTION, T::ORDER_BY) {
        Ok(docs) => docs,
        Err(err) => {
            warn!(collection = %T::COLLECTION, error = %err, "listener read failed");
            return;
        }
    };

    let mut items = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc.id.clone();
        match doc.into_record::<T>() {
            Ok(item) => items.push(item),
            Err(err) => {
                warn!(collection = %T::COLLECTION, id = %id, error = %err, "skipping malformed document");
            }
        }
    }
    store.replace(items);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::error::{StoreError, StoreResult};
    use crate::remote::{Document, Listener};
    use crate::schema::Collection;
    use serde_json::{json, Value};

    /// Document store whose reads can be switched off.
    struct FlakyReads {
        inner: db::DocumentStore,
        failing: AtomicBool,
    }

    impl RemoteBackend for FlakyReads {
        fn add(&self, collection: Collection, data: Value) -> StoreResult<String> {
            self.inner.add(collection, data)
        }
        fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<()> {
            self.inner.set(collection, id, data)
        }
        fn update(&self, collection: Collection, id: &str, patch: Value) -> StoreResult<()> {
            self.inner.update(collection, id, patch)
        }
        fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
            self.inner.delete(collection, id)
        }
        fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
            self.inner.get(collection, id)
        }
        fn list(&self, collection: Collection, order_by: Option<&str>) -> StoreResult<Vec<Document>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::NotConfigured);
            }
            self.inner.list(collection, order_by)
        }
        fn count_where(&self, collection: Collection, field: &str, value: i64) -> StoreResult<usize> {
            self.inner.count_where(collection, field, value)
        }
        fn watch(&self, collection: Collection, listener: Listener) -> WatchId {
            self.inner.watch(collection, listener)
        }
        fn unwatch(&self, id: WatchId) -> bool {
            self.inner.unwatch(id)
        }
        fn watcher_count(&self) -> usize {
            self.inner.watcher_count()
        }
    }

    fn banner(title: &str) -> Value {
        json!({
            "title": title,
            "subtitle": "",
            "ctaText": "Join",
            "ctaLink": "/volunteer",
            "placement": "hero",
            "bgGradient": "from-orange-500 to-red-500",
            "active": true
        })
    }

    fn banner_titles(store: &LocalStore) -> Vec<String> {
        store
            .items::<Banner>()
            .into_iter()
            .map(|banner| banner.title)
            .collect()
    }

    fn setup() -> (Arc<db::DocumentStore>, Arc<LocalStore>, SyncAdapter) {
        let docs = Arc::new(db::open_in_memory().unwrap());
        let store = Arc::new(LocalStore::seeded_with_samples().unwrap());
        let remote: Arc<dyn RemoteBackend> = docs.clone();
        let adapter = SyncAdapter::new(store.clone(), Some(remote));
        (docs, store, adapter)
    }

    #[test]
    fn unconfigured_adapter_keeps_sample_data() {
        let store = Arc::new(LocalStore::seeded_with_samples().unwrap());
        let before = store.get();
        let adapter = SyncAdapter::new(store.clone(), None);

        let handle = adapter.init();
        assert!(!handle.is_active());
        assert!(!adapter.is_initialized());
        assert_eq!(store.get(), before);
        handle.teardown();
    }

    #[test]
    fn init_replaces_samples_with_remote_contents() {
        let (docs, store, adapter) = setup();
        docs.add(
            Activity::COLLECTION,
            json!({
                "title": "Gate 6 drain desilting",
                "description": "",
                "category": "infrastructure",
                "date": "2026-02-01",
                "location": "Gate 6",
                "createdAt": "2026-02-01T00:00:00Z"
            }),
        )
        .unwrap();

        let handle = adapter.init();
        let snapshot = store.get();
        assert!(snapshot.remote_ready);
        assert_eq!(snapshot.activities.len(), 1);
        assert_eq!(snapshot.activities[0].title, "Gate 6 drain desilting");
        assert!(snapshot.events.is_empty());
        // impact stats are never synced
        assert!(!snapshot.impact_stats.is_empty());
        handle.teardown();
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let (docs, store, adapter) = setup();
        let handle = adapter.init();
        docs.set(WardUpdate::COLLECTION, "bad", json!({"title": 7})).unwrap();
        docs.set(
            WardUpdate::COLLECTION,
            "good",
            json!({
                "wardNumber": 48,
                "corporatorName": "Rafiq Iliyas Shaikh",
                "title": "Road resurfacing",
                "content": "Work starts Monday.",
                "createdAt": "2026-02-02T10:00:00Z"
            }),
        )
        .unwrap();
        docs.deliver_pending();

        let updates: Vec<WardUpdate> = store.items();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, "good");
        handle.teardown();
    }

    #[test]
    fn failed_read_keeps_stale_collection_and_listener_alive() {
        let flaky = Arc::new(FlakyReads {
            inner: db::open_in_memory().unwrap(),
            failing: AtomicBool::new(false),
        });
        let remote: Arc<dyn RemoteBackend> = flaky.clone();
        let store = Arc::new(LocalStore::seeded_with_samples().unwrap());
        let adapter = SyncAdapter::new(store.clone(), Some(remote.clone()));
        let handle = adapter.init();

        remote.add(Banner::COLLECTION, banner("Monsoon helpline")).unwrap();
        flaky.inner.deliver_pending();
        assert_eq!(banner_titles(&store), vec!["Monsoon helpline"]);

        flaky.failing.store(true, Ordering::SeqCst);
        remote.add(Banner::COLLECTION, banner("Blood donation camp")).unwrap();
        assert_eq!(flaky.inner.deliver_pending(), 1);
        assert_eq!(banner_titles(&store), vec!["Monsoon helpline"]);

        flaky.failing.store(false, Ordering::SeqCst);
        remote.add(Banner::COLLECTION, banner("Tree planting")).unwrap();
        flaky.inner.deliver_pending();
        assert_eq!(banner_titles(&store).len(), 3);
        assert_eq!(flaky.watcher_count(), 6);

        handle.teardown();
    }
}
