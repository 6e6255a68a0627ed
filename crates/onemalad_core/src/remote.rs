//! The seam between the local store and the hosted document database.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreResult;
use crate::schema::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: String,
    pub kind: ChangeKind,
}

/// Handle for one open change-feed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

pub type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Folds the document id back into the payload and decodes the record.
    pub fn into_record<T: DeserializeOwned>(self) -> StoreResult<T> {
        let mut data = self.data;
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id));
        }
        Ok(serde_json::from_value(data)?)
    }
}

pub trait RemoteBackend: Send + Sync {
    /// Creates a document with a generated id and returns that id.
    fn add(&self, collection: Collection, data: Value) -> StoreResult<String>;

    /// Creates or overwrites the document at `id`.
    fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<()>;

    /// Shallow-merges `patch` into an existing document.
    fn update(&self, collection: Collection, id: &str, patch: Value) -> StoreResult<()>;

    /// Deleting a missing document succeeds and emits nothing.
    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()>;

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    /// Lists a collection, descending by `order_by` when given.
    fn list(&self, collection: Collection, order_by: Option<&str>) -> StoreResult<Vec<Document>>;

    fn count_where(&self, collection: Collection, field: &str, value: i64) -> StoreResult<usize>;

    fn watch(&self, collection: Collection, listener: Listener) -> WatchId;

    /// Returns false when the watch was already closed.
    fn unwatch(&self, id: WatchId) -> bool;

    fn watcher_count(&self) -> usize;
}

/// Drops the `id` key so it never travels inside a create payload.
pub fn strip_id(mut data: Value) -> Value {
    if let Value::Object(map) = &mut data {
        map.remove("id");
    }
    data
}

/// Top-level field replace. Nested objects are replaced, not merged.
pub fn merge_patch(target: &mut Value, patch: Value) {
    let Value::Object(patch) = patch else {
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        for (key, value) in patch {
            map.insert(key, value);
        }
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
