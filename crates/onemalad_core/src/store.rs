//! In-memory reactive store read by the UI views.
//!
//! Collections are only ever replaced wholesale; every change notifies the
//! subscribed views with the full snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StoreResult;
use crate::remote::lock;
use crate::schema::{
    Activity, Banner, Collection, CommunityEvent, ImpactStat, Issue, Volunteer, WardUpdate,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub activities: Vec<Activity>,
    pub events: Vec<CommunityEvent>,
    pub volunteers: Vec<Volunteer>,
    pub banners: Vec<Banner>,
    pub ward_updates: Vec<WardUpdate>,
    pub impact_stats: Vec<ImpactStat>,
    #[serde(skip)]
    pub remote_ready: bool,
}

/// An entity that lives in a remote collection and a snapshot slot.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Field the synced list is sorted on, descending.
    const ORDER_BY: Option<&'static str>;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn slot(snapshot: &Snapshot) -> &Vec<Self>;
    fn slot_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr, $order:expr, $field:ident) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;
            const ORDER_BY: Option<&'static str> = $order;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn slot(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn slot_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

impl_record!(Issue, Collection::Issues, Some("createdAt"), issues);
impl_record!(Activity, Collection::Activities, Some("date"), activities);
impl_record!(CommunityEvent, Collection::Events, Some("date"), events);
impl_record!(Volunteer, Collection::Volunteers, Some("createdAt"), volunteers);
impl_record!(Banner, Collection::Banners, None, banners);
impl_record!(WardUpdate, Collection::WardUpdates, Some("createdAt"), ward_updates);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

pub type View = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Default)]
struct Views {
    next: u64,
    entries: Vec<(ViewId, View)>,
}

#[derive(Default)]
pub struct LocalStore {
    state: RwLock<Snapshot>,
    views: Mutex<Views>,
}

impl LocalStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            views: Mutex::new(Views::default()),
        }
    }

    /// Store seeded with the bundled demo data used in fallback mode.
    pub fn seeded_with_samples() -> StoreResult<Self> {
        Ok(Self::new(crate::sample::sample_snapshot()?))
    }

    pub fn get(&self) -> Snapshot {
        self.read().clone()
    }

    pub fn items<T: Record>(&self) -> Vec<T> {
        T::slot(&self.read()).clone()
    }

    pub fn find<T: Record>(&self, id: &str) -> Option<T> {
        T::slot(&self.read()).iter().find(|item| item.id() == id).cloned()
    }

    /// Replaces a whole collection. There is no partial or merge update.
    pub fn replace<T: Record>(&self, items: Vec<T>) {
        self.mutate(|snapshot| *T::slot_mut(snapshot) = items);
    }

    pub fn set_impact_stats(&self, stats: Vec<ImpactStat>) {
        self.mutate(|snapshot| snapshot.impact_stats = stats);
    }

    pub fn set_remote_ready(&self, ready: bool) {
        self.mutate(|snapshot| snapshot.remote_ready = ready);
    }

    pub fn subscribe(&self, view: View) -> ViewId {
        let mut views = lock(&self.views);
        views.next += 1;
        let id = ViewId(views.next);
        views.entries.push((id, view));
        id
    }

    pub fn unsubscribe(&self, id: ViewId) -> bool {
        let mut views = lock(&self.views);
        let before = views.entries.len();
        views.entries.retain(|(view, _)| *view != id);
        views.entries.len() != before
    }

    /// Applies `change` under the write lock, then notifies views with the
    /// resulting snapshot once the lock is released.
    pub(crate) fn mutate<R>(&self, change: impl FnOnce(&mut Snapshot) -> R) -> R {
        let (result, snapshot) = {
            let mut state = self.write();
            let result = change(&mut state);
            (result, state.clone())
        };
        let views: Vec<View> = lock(&self.views)
            .entries
            .iter()
            .map(|(_, view)| view.clone())
            .collect();
        for view in views {
            view(&snapshot);
        }
        result
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
