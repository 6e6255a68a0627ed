use rusqlite::{OptionalExtension, params, Connection};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::remote::{
    lock, merge_patch, ChangeEvent, ChangeKind, Document, Listener, RemoteBackend, WatchId,
};
use crate::schema::Collection;

/// SQLite-backed document store with a queued change feed.
///
/// Writes enqueue change events; nothing reaches watchers until
/// [`DocumentStore::deliver_pending`] runs, which stands in for the
/// network round-trip of a hosted database.
pub struct DocumentStore {
    conn: Mutex<Connection>,
    feed: Mutex<Feed>,
}

#[derive(Default)]
struct Feed {
    pending: VecDeque<ChangeEvent>,
    watchers: Vec<(WatchId, Collection, Listener)>,
    next_watch: u64,
}

pub fn open(db_path: &str) -> StoreResult<DocumentStore> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    Ok(DocumentStore::from_connection(conn))
}

pub fn open_in_memory() -> StoreResult<DocumentStore> {
    let conn = Connection::open_in_memory()?;
    init(&conn)?;
    Ok(DocumentStore::from_connection(conn))
}

fn init(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          collection TEXT NOT NULL,
          id TEXT NOT NULL,
          body_json TEXT NOT NULL,
          inserted_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
          UNIQUE(collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
        "#,
    )?;
    Ok(())
}

impl DocumentStore {
    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            feed: Mutex::new(Feed::default()),
        }
    }

    /// Delivers every queued change to the watchers of its collection.
    /// Listeners run without any store lock held. Returns events delivered.
    pub fn deliver_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let (event, listeners) = {
                let mut feed = lock(&self.feed);
                let Some(event) = feed.pending.pop_front() else {
                    break;
                };
                let listeners: Vec<Listener> = feed
                    .watchers
                    .iter()
                    .filter(|(_, collection, _)| *collection == event.collection)
                    .map(|(_, _, listener)| listener.clone())
                    .collect();
                (event, listeners)
            };
            debug!(
                collection = %event.collection,
                id = %event.id,
                watchers = listeners.len(),
                "delivering change"
            );
            for listener in listeners {
                listener(&event);
            }
            delivered += 1;
        }
        delivered
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.feed).pending.len()
    }

    fn enqueue(&self, collection: Collection, id: &str, kind: ChangeKind) {
        lock(&self.feed).pending.push_back(ChangeEvent {
            collection,
            id: id.to_string(),
            kind,
        });
    }

    fn upsert(conn: &Connection, collection: Collection, id: &str, data: &Value) -> StoreResult<()> {
        let body_json = serde_json::to_string(data)?;
        conn.execute(
            r#"
            INSERT INTO documents (collection, id, body_json)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(collection, id) DO UPDATE SET
              body_json=excluded.body_json
            "#,
            params![collection.as_str(), id, body_json],
        )?;
        Ok(())
    }

    fn fetch(conn: &Connection, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        let body: Option<String> = conn
            .query_row(
                "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

impl RemoteBackend for DocumentStore {
    fn add(&self, collection: Collection, data: Value) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        {
            let conn = lock(&self.conn);
            Self::upsert(&conn, collection, &id, &data)?;
        }
        self.enqueue(collection, &id, ChangeKind::Added);
        Ok(id)
    }

    fn set(&self, collection: Collection, id: &str, data: Value) -> StoreResult<()> {
        let existed = {
            let conn = lock(&self.conn);
            let existed = Self::fetch(&conn, collection, id)?.is_some();
            Self::upsert(&conn, collection, id, &data)?;
            existed
        };
        let kind = if existed {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.enqueue(collection, id, kind);
        Ok(())
    }

    fn update(&self, collection: Collection, id: &str, patch: Value) -> StoreResult<()> {
        {
            let conn = lock(&self.conn);
            let mut current = Self::fetch(&conn, collection, id)?
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            merge_patch(&mut current, patch);
            Self::upsert(&conn, collection, id, &current)?;
        }
        self.enqueue(collection, id, ChangeKind::Modified);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let removed = {
            let conn = lock(&self.conn);
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
            )?
        };
        if removed > 0 {
            self.enqueue(collection, id, ChangeKind::Removed);
        }
        Ok(())
    }

    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let conn = lock(&self.conn);
        Ok(Self::fetch(&conn, collection, id)?.map(|data| Document {
            id: id.to_string(),
            data,
        }))
    }

    fn list(&self, collection: Collection, order_by: Option<&str>) -> StoreResult<Vec<Document>> {
        let conn = lock(&self.conn);
        let rows: Vec<(String, String)> = match order_by {
            Some(field) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, body_json
                    FROM documents
                    WHERE collection = ?1
                    ORDER BY json_extract(body_json, ?2) DESC, seq DESC
                    "#,
                )?;
                let path = format!("$.{field}");
                stmt.query_map(params![collection.as_str(), path], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, body_json FROM documents WHERE collection = ?1 ORDER BY seq ASC",
                )?;
                stmt.query_map(params![collection.as_str()], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
            }
        };

        rows.into_iter()
            .map(|(id, body)| -> StoreResult<Document> {
                Ok(Document {
                    id,
                    data: serde_json::from_str(&body)?,
                })
            })
            .collect()
    }

    fn count_where(&self, collection: Collection, field: &str, value: i64) -> StoreResult<usize> {
        let conn = lock(&self.conn);
        let count: i64 = conn.query_row(
            r#"
            SELECT COUNT(*) FROM documents
            WHERE collection = ?1 AND json_extract(body_json, ?2) = ?3
            "#,
            params![collection.as_str(), format!("$.{field}"), value],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn watch(&self, collection: Collection, listener: Listener) -> WatchId {
        let mut feed = lock(&self.feed);
        feed.next_watch += 1;
        let id = WatchId(feed.next_watch);
        feed.watchers.push((id, collection, listener));
        id
    }

    fn unwatch(&self, id: WatchId) -> bool {
        let mut feed = lock(&self.feed);
        let before = feed.watchers.len();
        feed.watchers.retain(|(watch, _, _)| *watch != id);
        feed.watchers.len() != before
    }

    fn watcher_count(&self) -> usize {
        lock(&self.feed).watchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn add_generates_ids_and_queues_until_delivery() {
        let store = open_in_memory().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.watch(
            Collection::Events,
            Arc::new(move |event: &ChangeEvent| sink.lock().unwrap().push(event.clone())),
        );

        let id = store.add(Collection::Events, json!({"title": "Mela"})).unwrap();
        assert!(!id.is_empty());
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(store.pending_len(), 1);

        assert_eq!(store.deliver_pending(), 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, id);
        assert_eq!(seen[0].kind, ChangeKind::Added);
    }

    #[test]
    fn watchers_only_hear_their_collection() {
        let store = open_in_memory().unwrap();
        let hits = Arc::new(Mutex::new(0));
        let sink = hits.clone();
        store.watch(
            Collection::Banners,
            Arc::new(move |_: &ChangeEvent| *sink.lock().unwrap() += 1),
        );
        store.add(Collection::Events, json!({})).unwrap();
        store.deliver_pending();
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn list_orders_descending_by_field() {
        let store = open_in_memory().unwrap();
        store.add(Collection::Activities, json!({"date": "2026-01-05"})).unwrap();
        store.add(Collection::Activities, json!({"date": "2026-03-01"})).unwrap();
        store.add(Collection::Activities, json!({"date": "2025-12-24"})).unwrap();

        let dates: Vec<String> = store
            .list(Collection::Activities, Some("date"))
            .unwrap()
            .into_iter()
            .map(|doc| doc.data["date"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(dates, vec!["2026-03-01", "2026-01-05", "2025-12-24"]);
    }

    #[test]
    fn update_merges_and_missing_doc_is_not_found() {
        let store = open_in_memory().unwrap();
        store
            .set(Collection::Users, "u1", json!({"role": "citizen", "email": "a@b.in"}))
            .unwrap();
        store
            .update(Collection::Users, "u1", json!({"role": "admin"}))
            .unwrap();
        let doc = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(doc.data, json!({"role": "admin", "email": "a@b.in"}));

        let err = store
            .update(Collection::Users, "ghost", json!({"role": "admin"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn deleting_missing_doc_emits_nothing() {
        let store = open_in_memory().unwrap();
        store.delete(Collection::Issues, "nope").unwrap();
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn count_where_matches_integer_field() {
        let store = open_in_memory().unwrap();
        store.set(Collection::Supports, "32_a", json!({"wardNumber": 32})).unwrap();
        store.set(Collection::Supports, "32_b", json!({"wardNumber": 32})).unwrap();
        store.set(Collection::Supports, "33_a", json!({"wardNumber": 33})).unwrap();
        assert_eq!(store.count_where(Collection::Supports, "wardNumber", 32).unwrap(), 2);
        assert_eq!(store.count_where(Collection::Supports, "wardNumber", 48).unwrap(), 0);
    }

    #[test]
    fn unwatch_is_reported_once() {
        let store = open_in_memory().unwrap();
        let id = store.watch(Collection::Issues, Arc::new(|_: &ChangeEvent| {}));
        assert_eq!(store.watcher_count(), 1);
        assert!(store.unwatch(id));
        assert!(!store.unwatch(id));
        assert_eq!(store.watcher_count(), 0);
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db");
        let path = path.to_str().unwrap();
        {
            let store = open(path).unwrap();
            store.set(Collection::Banners, "b1", json!({"active": true})).unwrap();
        }
        let store = open(path).unwrap();
        assert!(store.get(Collection::Banners, "b1").unwrap().is_some());
    }
}
