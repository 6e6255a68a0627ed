//! Explicitly constructed application context handed to every view.

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::db::{self, DocumentStore};
use crate::dispatch::Dispatcher;
use crate::error::StoreResult;
use crate::remote::RemoteBackend;
use crate::storage::FsObjectStore;
use crate::store::LocalStore;
use crate::support::SupportBook;
use crate::sync::SyncAdapter;
use crate::users::UserDirectory;

pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<LocalStore>,
    pub documents: Option<Arc<DocumentStore>>,
    pub sync: SyncAdapter,
    pub dispatcher: Dispatcher,
    pub supports: SupportBook,
    pub users: UserDirectory,
    pub objects: FsObjectStore,
}

impl AppContext {
    /// Opens the document store only when the backend credentials check out;
    /// otherwise runs in fallback mode on the bundled sample data.
    pub fn from_config(config: AppConfig) -> StoreResult<Self> {
        let documents = if config.backend.is_configured() {
            info!(db_path = %config.backend.db_path, "remote backend configured");
            Some(Arc::new(db::open(&config.backend.db_path)?))
        } else {
            info!("remote backend not configured; running in fallback mode");
            None
        };
        Self::assemble(config, documents)
    }

    pub fn with_documents(config: AppConfig, documents: Option<Arc<DocumentStore>>) -> StoreResult<Self> {
        Self::assemble(config, documents)
    }

    fn assemble(config: AppConfig, documents: Option<Arc<DocumentStore>>) -> StoreResult<Self> {
        let store = Arc::new(LocalStore::seeded_with_samples()?);
        let remote: Option<Arc<dyn RemoteBackend>> = documents
            .clone()
            .map(|documents| documents as Arc<dyn RemoteBackend>);
        let objects = FsObjectStore::from_config(&config.storage);

        Ok(Self {
            sync: SyncAdapter::new(store.clone(), remote.clone()),
            dispatcher: Dispatcher::new(store.clone(), remote.clone()),
            supports: SupportBook::new(remote.clone()),
            users: UserDirectory::new(remote),
            objects,
            store,
            documents,
            config,
        })
    }

    pub fn is_remote(&self) -> bool {
        self.documents.is_some()
    }

    /// Delivers queued remote changes to the sync listeners.
    pub fn deliver_pending(&self) -> usize {
        self.documents
            .as_ref()
            .map_or(0, |documents| documents.deliver_pending())
    }
}
