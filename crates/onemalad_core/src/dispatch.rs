//! Per-entity create/update/delete helpers.
//!
//! With a remote backend configured, writes go only to the remote store and
//! the local snapshot catches up when the change feed is delivered. Without
//! one, the local store is mutated directly and is the only source of truth.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock;
use crate::error::{StoreError, StoreResult};
use crate::remote::{merge_patch, strip_id, RemoteBackend};
use crate::schema::{
    Activity, Banner, CommunityEvent, Issue, IssueStatus, Volunteer, VolunteerStatus, WardUpdate,
};
use crate::store::{LocalStore, Record};

pub struct Dispatcher {
    store: Arc<LocalStore>,
    remote: Option<Arc<dyn RemoteBackend>>,
}

impl Dispatcher {
    pub fn new(store: Arc<LocalStore>, remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        Self { store, remote }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Returns the id the record ends up with: generated by the remote store,
    /// or a millisecond timestamp in fallback mode when the record has none.
    pub fn create<T: Record>(&self, mut record: T) -> StoreResult<String> {
        match &self.remote {
            Some(remote) => {
                let data = strip_id(serde_json::to_value(&record)?);
                let id = remote
                    .add(T::COLLECTION, data)
                    .inspect_err(|err| warn!(collection = %T::COLLECTION, error = %err, "create failed"))?;
                debug!(collection = %T::COLLECTION, id = %id, "created remotely");
                Ok(id)
            }
            None => {
                if record.id().is_empty() {
                    record.set_id(clock::unix_millis().to_string());
                }
                let id = record.id().to_string();
                self.store
                    .mutate(|snapshot| T::slot_mut(snapshot).insert(0, record));
                debug!(collection = %T::COLLECTION, id = %id, "created locally");
                Ok(id)
            }
        }
    }

    pub fn delete<T: Record>(&self, id: &str) -> StoreResult<()> {
        match &self.remote {
            Some(remote) => remote
                .delete(T::COLLECTION, id)
                .inspect_err(|err| warn!(collection = %T::COLLECTION, id, error = %err, "delete failed")),
            None => {
                self.store
                    .mutate(|snapshot| T::slot_mut(snapshot).retain(|item| item.id() != id));
                Ok(())
            }
        }
    }

    /// Replaces the top-level fields named in `patch`.
    pub fn update<T: Record>(&self, id: &str, patch: Value) -> StoreResult<()> {
        match &self.remote {
            Some(remote) => remote
                .update(T::COLLECTION, id, patch)
                .inspect_err(|err| warn!(collection = %T::COLLECTION, id, error = %err, "update failed")),
            None => {
                let current = self
                    .store
                    .find::<T>(id)
                    .ok_or_else(|| StoreError::not_found(T::COLLECTION, id))?;
                let mut value = serde_json::to_value(&current)?;
                merge_patch(&mut value, patch);
                let mut updated: T = serde_json::from_value(value)?;
                updated.set_id(id.to_string());

                self.store.mutate(|snapshot| {
                    if let Some(slot) = T::slot_mut(snapshot).iter_mut().find(|item| item.id() == id) {
                        *slot = updated;
                    }
                });
                Ok(())
            }
        }
    }

    fn current<T: Record>(&self, id: &str) -> StoreResult<T> {
        let found = match &self.remote {
            Some(remote) => remote
                .get(T::COLLECTION, id)?
                .map(|doc| doc.into_record::<T>())
                .transpose()?,
            None => self.store.find::<T>(id),
        };
        found.ok_or_else(|| StoreError::not_found(T::COLLECTION, id))
    }

    pub fn add_issue(&self, issue: Issue) -> StoreResult<String> {
        self.create(issue)
    }

    /// Any transition is allowed; `resolvedAt` is stamped on resolve.
    pub fn update_issue_status(&self, id: &str, status: IssueStatus) -> StoreResult<()> {
        let now = clock::now_rfc3339();
        let mut patch = json!({ "status": status, "updatedAt": now });
        if status == IssueStatus::Resolved {
            patch["resolvedAt"] = json!(now);
        }
        self.update::<Issue>(id, patch)
    }

    pub fn resolve_issue(
        &self,
        id: &str,
        response: Option<String>,
        proof_urls: Vec<String>,
    ) -> StoreResult<()> {
        let now = clock::now_rfc3339();
        let mut patch = json!({
            "status": IssueStatus::Resolved,
            "updatedAt": now,
            "resolvedAt": now,
        });
        if let Some(response) = response.filter(|text| !text.trim().is_empty()) {
            patch["corporatorResponse"] = json!(response.trim());
        }
        if !proof_urls.is_empty() {
            patch["resolvedImageUrls"] = json!(proof_urls);
        }
        self.update::<Issue>(id, patch)
    }

    /// Returns the new upvote count.
    pub fn upvote_issue(&self, id: &str) -> StoreResult<u32> {
        let issue = self.current::<Issue>(id)?;
        let upvotes = issue.upvotes.saturating_add(1);
        self.update::<Issue>(id, json!({ "upvotes": upvotes }))?;
        Ok(upvotes)
    }

    pub fn add_activity(&self, activity: Activity) -> StoreResult<String> {
        self.create(activity)
    }

    pub fn delete_activity(&self, id: &str) -> StoreResult<()> {
        self.delete::<Activity>(id)
    }

    pub fn add_event(&self, event: CommunityEvent) -> StoreResult<String> {
        self.create(event)
    }

    pub fn delete_event(&self, id: &str) -> StoreResult<()> {
        self.delete::<CommunityEvent>(id)
    }

    pub fn add_volunteer(&self, volunteer: Volunteer) -> StoreResult<String> {
        self.create(volunteer)
    }

    pub fn update_volunteer_status(&self, id: &str, status: VolunteerStatus) -> StoreResult<()> {
        self.update::<Volunteer>(id, json!({ "status": status }))
    }

    pub fn add_banner(&self, banner: Banner) -> StoreResult<String> {
        self.create(banner)
    }

    pub fn set_banner_active(&self, id: &str, active: bool) -> StoreResult<()> {
        self.update::<Banner>(id, json!({ "active": active }))
    }

    pub fn delete_banner(&self, id: &str) -> StoreResult<()> {
        self.delete::<Banner>(id)
    }

    pub fn add_ward_update(&self, update: WardUpdate) -> StoreResult<String> {
        self.create(update)
    }

    pub fn delete_ward_update(&self, id: &str) -> StoreResult<()> {
        self.delete::<WardUpdate>(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::schema::{IssueCategory, IssueStatus};

    fn issue(title: &str) -> Issue {
        Issue {
            id: String::new(),
            title: title.to_string(),
            description: "Water logging after rain".to_string(),
            category: IssueCategory::Drainage,
            status: IssueStatus::Pending,
            ward_number: 34,
            location: "Gate 7".to_string(),
            latitude: None,
            longitude: None,
            image_urls: Vec::new(),
            user_name: "Asha Rao".to_string(),
            user_email: "asha@example.com".to_string(),
            upvotes: 0,
            created_at: "2026-02-01T00:00:00Z".to_string(),
            updated_at: "2026-02-01T00:00:00Z".to_string(),
            resolved_at: None,
            corporator_response: None,
            resolved_image_urls: None,
        }
    }

    fn local() -> (Arc<LocalStore>, Dispatcher) {
        let store = Arc::new(LocalStore::default());
        (store.clone(), Dispatcher::new(store, None))
    }

    #[test]
    fn local_create_prepends_with_timestamp_id() {
        let (store, dispatcher) = local();
        dispatcher.add_issue(issue("first")).unwrap();
        let id = dispatcher.add_issue(issue("second")).unwrap();

        assert!(id.parse::<i128>().is_ok());
        let issues: Vec<Issue> = store.items();
        assert_eq!(issues[0].title, "second");
        assert_eq!(issues[1].title, "first");
    }

    #[test]
    fn local_status_update_stamps_resolution() {
        let (store, dispatcher) = local();
        let id = dispatcher.add_issue(issue("pothole")).unwrap();

        dispatcher.update_issue_status(&id, IssueStatus::InProgress).unwrap();
        let current = store.find::<Issue>(&id).unwrap();
        assert_eq!(current.status, IssueStatus::InProgress);
        assert!(current.resolved_at.is_none());

        dispatcher.update_issue_status(&id, IssueStatus::Resolved).unwrap();
        let current = store.find::<Issue>(&id).unwrap();
        assert_eq!(current.status, IssueStatus::Resolved);
        assert!(current.resolved_at.is_some());

        // backwards transitions are not rejected
        dispatcher.update_issue_status(&id, IssueStatus::Pending).unwrap();
        assert_eq!(store.find::<Issue>(&id).unwrap().status, IssueStatus::Pending);
    }

    #[test]
    fn local_update_of_unknown_id_is_not_found() {
        let (_, dispatcher) = local();
        let err = dispatcher.set_banner_active("missing", false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn resolve_records_response_and_proof() {
        let (store, dispatcher) = local();
        let id = dispatcher.add_issue(issue("garbage pile")).unwrap();
        dispatcher
            .resolve_issue(
                &id,
                Some("  Cleared by the SWM team. ".to_string()),
                vec!["https://cdn.example/proof.jpg".to_string()],
            )
            .unwrap();

        let resolved = store.find::<Issue>(&id).unwrap();
        assert_eq!(resolved.status, IssueStatus::Resolved);
        assert_eq!(
            resolved.corporator_response.as_deref(),
            Some("Cleared by the SWM team.")
        );
        assert_eq!(resolved.resolved_image_urls.unwrap().len(), 1);
    }

    #[test]
    fn remote_writes_strip_id_and_leave_local_untouched() {
        let docs = Arc::new(db::open_in_memory().unwrap());
        let store = Arc::new(LocalStore::default());
        let remote: Arc<dyn RemoteBackend> = docs.clone();
        let dispatcher = Dispatcher::new(store.clone(), Some(remote));

        let mut draft = issue("broken streetlight");
        draft.id = "client-side".to_string();
        let id = dispatcher.add_issue(draft).unwrap();

        assert_ne!(id, "client-side");
        assert!(store.items::<Issue>().is_empty());
        let doc = docs.get(Issue::COLLECTION, &id).unwrap().unwrap();
        assert!(doc.data.get("id").is_none());

        assert_eq!(dispatcher.upvote_issue(&id).unwrap(), 1);
        assert_eq!(dispatcher.upvote_issue(&id).unwrap(), 2);
    }

    #[test]
    fn remote_update_of_missing_doc_errors() {
        let docs = Arc::new(db::open_in_memory().unwrap());
        let remote: Arc<dyn RemoteBackend> = docs;
        let dispatcher = Dispatcher::new(Arc::new(LocalStore::default()), Some(remote));
        let err = dispatcher
            .update_volunteer_status("ghost", VolunteerStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
