//! The "I Support" toggle for ward corporators.

use serde_json::json;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use crate::clock;
use crate::error::{StoreError, StoreResult};
use crate::remote::{ChangeEvent, RemoteBackend, WatchId};
use crate::schema::Collection;

pub struct SupportBook {
    remote: Option<Arc<dyn RemoteBackend>>,
}

pub fn support_id(ward_number: u32, user_id: &str) -> String {
    format!("{ward_number}_{user_id}")
}

impl SupportBook {
    pub fn new(remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        Self { remote }
    }

    fn remote(&self) -> StoreResult<&Arc<dyn RemoteBackend>> {
        self.remote.as_ref().ok_or(StoreError::NotConfigured)
    }

    /// Flips whether `user_id` supports the ward. Returns the new state.
    pub fn toggle(&self, ward_number: u32, user_id: &str) -> StoreResult<bool> {
        let remote = self.remote()?;
        let id = support_id(ward_number, user_id);
        if remote.get(Collection::Supports, &id)?.is_some() {
            remote.delete(Collection::Supports, &id)?;
            debug!(support = %id, "support withdrawn");
            Ok(false)
        } else {
            remote.set(
                Collection::Supports,
                &id,
                json!({
                    "wardNumber": ward_number,
                    "userId": user_id,
                    "createdAt": clock::now_rfc3339(),
                }),
            )?;
            debug!(support = %id, "support added");
            Ok(true)
        }
    }

    pub fn has_supported(&self, ward_number: u32, user_id: &str) -> StoreResult<bool> {
        let id = support_id(ward_number, user_id);
        Ok(self.remote()?.get(Collection::Supports, &id)?.is_some())
    }

    pub fn count(&self, ward_number: u32) -> StoreResult<usize> {
        self.remote()?
            .count_where(Collection::Supports, "wardNumber", i64::from(ward_number))
    }

    /// Live supporter count for one ward. `on_count` gets the current value
    /// right away and a fresh count after every delivered support change.
    /// Close it with [`SupportBook::unwatch_count`].
    pub fn watch_count<F>(&self, ward_number: u32, on_count: F) -> StoreResult<WatchId>
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        let remote = self.remote()?;
        on_count(self.count(ward_number)?);

        let weak_remote: Weak<dyn RemoteBackend> = Arc::downgrade(remote);
        let id = remote.watch(
            Collection::Supports,
            Arc::new(move |_: &ChangeEvent| {
                let Some(remote) = weak_remote.upgrade() else {
                    return;
                };
                match remote.count_where(Collection::Supports, "wardNumber", i64::from(ward_number)) {
                    Ok(count) => on_count(count),
                    Err(err) => warn!(ward = ward_number, error = %err, "support count read failed"),
                }
            }),
        );
        Ok(id)
    }

    pub fn unwatch_count(&self, id: WatchId) -> bool {
        self.remote
            .as_ref()
            .is_some_and(|remote| remote.unwatch(id))
    }
}
