//! Entity store access.
//!
//! The store itself is hosted; this module only defines the list/create/update
//! contract the pages depend on, plus typed helpers that move records across
//! the JSON boundary.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{Collection, Entity, SortKey};

pub mod http;
pub mod memory;

pub use http::HttpEntityStore;
pub use memory::MemoryStore;

/// Generic operations against named collections.
///
/// No transactions and no deletes; results are eventually consistent and
/// ordered only by the sort key the caller asked for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn list(
        &self,
        collection: Collection,
        sort: Option<SortKey>,
    ) -> Result<Vec<Value>, StoreError>;

    /// Returns the stored record, including the id the store assigned.
    async fn create(&self, collection: Collection, record: Value) -> Result<Value, StoreError>;

    /// Applies a partial patch and returns the updated record.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, StoreError>;
}

pub fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(StoreError::Encode)
}

pub fn decode<E: Entity>(value: Value) -> Result<E, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Decode {
        collection: E::COLLECTION,
        source,
    })
}

pub fn decode_all<E: Entity>(
    values: impl IntoIterator<Item = Value>,
) -> Result<Vec<E>, StoreError> {
    values.into_iter().map(decode::<E>).collect()
}

pub async fn create<E: Entity>(store: &dyn EntityStore, record: &E::New) -> Result<E, StoreError> {
    let created = store.create(E::COLLECTION, encode(record)?).await?;
    decode(created)
}

pub async fn update<E: Entity>(
    store: &dyn EntityStore,
    id: &str,
    patch: &E::Patch,
) -> Result<E, StoreError> {
    let updated = store.update(E::COLLECTION, id, encode(patch)?).await?;
    decode(updated)
}
