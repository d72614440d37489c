//! The handle every page service is built from.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cache::QueryCache;
use crate::config::{BackendKind, Settings};
use crate::error::{HmsError, StoreError};
use crate::hosted::HostedApi;
use crate::models::{Entity, SortKey};
use crate::notify::{HttpNotifier, LogNotifier, Notifier};
use crate::store::{self, EntityStore, HttpEntityStore, MemoryStore};

/// Store, notifier, cache and settings, shared by cloning.
#[derive(Clone)]
pub struct HmsContext {
    pub store: Arc<dyn EntityStore>,
    pub notifier: Arc<dyn Notifier>,
    pub cache: Arc<QueryCache>,
    pub settings: Arc<Settings>,
}

impl HmsContext {
    pub fn new(
        store: Arc<dyn EntityStore>,
        notifier: Arc<dyn Notifier>,
        settings: Settings,
    ) -> Self {
        let cache = QueryCache::new(settings.cache.stale_after());
        Self {
            store,
            notifier,
            cache: Arc::new(cache),
            settings: Arc::new(settings),
        }
    }

    /// Builds the backend the settings ask for.
    pub fn connect(settings: Settings) -> Result<Self, HmsError> {
        let (store, notifier): (Arc<dyn EntityStore>, Arc<dyn Notifier>) =
            match settings.backend.kind {
                BackendKind::Hosted => {
                    let api = HostedApi::new(&settings.backend)?;
                    info!("Using hosted entity store at {}", settings.backend.base_url);
                    let notifier: Arc<dyn Notifier> = if settings.notifications.enabled {
                        Arc::new(HttpNotifier::new(api.clone()))
                    } else {
                        Arc::new(LogNotifier)
                    };
                    (Arc::new(HttpEntityStore::with_api(api)), notifier)
                }
                BackendKind::Memory => {
                    let store = match &settings.backend.fixture {
                        Some(path) => MemoryStore::from_fixture_file(path)?,
                        None => MemoryStore::new(),
                    };
                    info!("Using in-memory entity store");
                    (Arc::new(store), Arc::new(LogNotifier))
                }
            };

        Ok(Self::new(store, notifier, settings))
    }

    pub async fn list<E: Entity>(&self, sort: Option<SortKey>) -> Result<Vec<E>, StoreError> {
        self.cache.list(self.store.as_ref(), sort).await
    }

    /// Creates a record, then refetches its collection.
    #[instrument(skip_all, fields(collection = %E::COLLECTION))]
    pub async fn create<E: Entity>(&self, record: &E::New) -> Result<E, StoreError> {
        let created = store::create::<E>(self.store.as_ref(), record).await?;
        info!("Created {} {}", E::COLLECTION, created.id());
        self.refresh::<E>().await;
        Ok(created)
    }

    /// Patches a record, then refetches its collection. A failed patch leaves
    /// the cache untouched.
    #[instrument(skip(self, patch), fields(collection = %E::COLLECTION))]
    pub async fn update<E: Entity>(&self, id: &str, patch: &E::Patch) -> Result<E, StoreError> {
        let updated = store::update::<E>(self.store.as_ref(), id, patch).await?;
        info!("Updated {} {}", E::COLLECTION, id);
        self.refresh::<E>().await;
        Ok(updated)
    }

    async fn refresh<E: Entity>(&self) {
        if let Err(e) = self.cache.refresh(self.store.as_ref(), E::COLLECTION).await {
            // The mutation stands; the next list call retries the fetch.
            warn!("Refetch of {} after mutation failed: {}", E::COLLECTION, e);
        }
    }
}
