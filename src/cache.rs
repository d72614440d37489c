//! Per-collection query cache.
//!
//! Lists are cached per collection together with the sort key they were
//! fetched with. After a successful mutation the owning collection is
//! invalidated and refetched; mutation responses are never merged in.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::models::{Collection, Entity, SortKey};
use crate::store::{decode_all, EntityStore};

struct CachedList {
    sort: Option<SortKey>,
    records: Arc<Vec<Value>>,
    fetched_at: Instant,
}

pub struct QueryCache {
    lists: DashMap<Collection, CachedList>,
    stale_after: Option<Duration>,
}

impl QueryCache {
    /// `stale_after` of `None` keeps entries until they are invalidated.
    pub fn new(stale_after: Option<Duration>) -> Self {
        Self {
            lists: DashMap::new(),
            stale_after,
        }
    }

    pub async fn list<E: Entity>(
        &self,
        store: &dyn EntityStore,
        sort: Option<SortKey>,
    ) -> Result<Vec<E>, StoreError> {
        let records = self.fetch(store, E::COLLECTION, sort).await?;
        decode_all(records.iter().cloned())
    }

    #[instrument(skip(self, store), fields(collection = %collection))]
    async fn fetch(
        &self,
        store: &dyn EntityStore,
        collection: Collection,
        sort: Option<SortKey>,
    ) -> Result<Arc<Vec<Value>>, StoreError> {
        if let Some(cached) = self.lists.get(&collection) {
            if cached.sort == sort && !self.is_stale(cached.fetched_at) {
                debug!("Cache hit for {}", collection);
                return Ok(Arc::clone(&cached.records));
            }
        }

        let records = Arc::new(store.list(collection, sort.clone()).await?);
        self.lists.insert(
            collection,
            CachedList {
                sort,
                records: Arc::clone(&records),
                fetched_at: Instant::now(),
            },
        );
        Ok(records)
    }

    fn is_stale(&self, fetched_at: Instant) -> bool {
        self.stale_after
            .map_or(false, |limit| fetched_at.elapsed() >= limit)
    }

    /// Drops the cached list; the next read goes to the store.
    pub fn invalidate(&self, collection: Collection) {
        self.lists.remove(&collection);
    }

    /// Invalidates and immediately refetches with the last requested sort key.
    /// A collection nobody has listed yet is left alone.
    #[instrument(skip(self, store), fields(collection = %collection))]
    pub async fn refresh(
        &self,
        store: &dyn EntityStore,
        collection: Collection,
    ) -> Result<(), StoreError> {
        let Some((_, previous)) = self.lists.remove(&collection) else {
            return Ok(());
        };
        self.fetch(store, collection, previous.sort).await?;
        Ok(())
    }

    pub fn is_cached(&self, collection: Collection) -> bool {
        self.lists.contains_key(&collection)
    }

    /// Raw cached records, mostly useful for inspection in tests.
    pub fn snapshot(&self, collection: Collection) -> Option<Arc<Vec<Value>>> {
        self.lists.get(&collection).map(|cached| Arc::clone(&cached.records))
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TriageCase;
    use crate::store::MockEntityStore;
    use mockall::predicate::eq;
    use serde_json::json;

    fn case(id: &str, score: i64) -> Value {
        json!({ "id": id, "patient_name": "P", "severity_level": "low", "priority_score": score })
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let mut store = MockEntityStore::new();
        store
            .expect_list()
            .with(eq(Collection::TriageCase), eq(Some(SortKey::parse("-priority_score"))))
            .times(1)
            .returning(|_, _| Ok(vec![case("a", 2)]));

        let cache = QueryCache::default();
        let sort = Some(SortKey::parse("-priority_score"));
        let first: Vec<TriageCase> = cache.list(&store, sort.clone()).await.unwrap();
        let second: Vec<TriageCase> = cache.list(&store, sort).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn different_sort_key_refetches() {
        let mut store = MockEntityStore::new();
        store.expect_list().times(2).returning(|_, _| Ok(vec![case("a", 2)]));

        let cache = QueryCache::default();
        let sort = Some(SortKey::parse("-priority_score"));
        let _: Vec<TriageCase> = cache.list(&store, sort).await.unwrap();
        let _: Vec<TriageCase> = cache.list(&store, None).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_reuses_last_sort_key() {
        let mut store = MockEntityStore::new();
        let mut calls = 0;
        store
            .expect_list()
            .with(eq(Collection::TriageCase), eq(Some(SortKey::parse("-priority_score"))))
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                Ok(vec![case("a", calls)])
            });

        let cache = QueryCache::default();
        let sort = Some(SortKey::parse("-priority_score"));
        let _: Vec<TriageCase> = cache.list(&store, sort).await.unwrap();
        cache.refresh(&store, Collection::TriageCase).await.unwrap();

        let snapshot = cache.snapshot(Collection::TriageCase).unwrap();
        assert_eq!(snapshot[0]["priority_score"], 2);
    }

    #[tokio::test]
    async fn refresh_of_unlisted_collection_makes_no_call() {
        let store = MockEntityStore::new();
        let cache = QueryCache::default();
        cache.refresh(&store, Collection::InventoryItem).await.unwrap();
        assert!(!cache.is_cached(Collection::InventoryItem));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_nothing_cached() {
        let mut store = MockEntityStore::new();
        store.expect_list().returning(|_, _| {
            Err(StoreError::Status {
                status: 503,
                body: "down".into(),
            })
        });

        let cache = QueryCache::default();
        let result: Result<Vec<TriageCase>, _> = cache.list(&store, None).await;
        assert!(result.is_err());
        assert!(!cache.is_cached(Collection::TriageCase));
    }
}
