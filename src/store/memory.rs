//! In-process entity store used for offline runs and tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::EntityStore;
use crate::error::StoreError;
use crate::models::{Collection, SortKey};

/// Keeps every collection as a vector of JSON records.
///
/// Mirrors what the hosted store does on write: assigns `id`,
/// `created_date` and `updated_date`, and shallow-merges patches.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<Collection, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a fixture of the form `{"TriageCase": [...], "Prescription": [...]}`.
    pub fn from_fixture_str(raw: &str) -> Result<Self, StoreError> {
        let fixture: HashMap<String, Vec<Value>> =
            serde_json::from_str(raw).map_err(|e| StoreError::Fixture(e.to_string()))?;

        let store = Self::new();
        for (name, records) in fixture {
            let collection = Collection::from_name(&name)
                .ok_or_else(|| StoreError::Fixture(format!("unknown collection {}", name)))?;
            store.seed(collection, records)?;
        }
        Ok(store)
    }

    pub fn from_fixture_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_fixture_str(&raw)?;
        info!("Loaded fixture from {}", path.display());
        Ok(store)
    }

    /// Inserts records as-is, assigning an id only where one is missing.
    pub fn seed(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        let mut rows = self.collections.entry(collection).or_default();
        for record in records {
            let mut object = into_object(record)?;
            object
                .entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            rows.push(Value::Object(object));
        }
        Ok(())
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, |rows| rows.len())
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }
}

fn into_object(record: Value) -> Result<Map<String, Value>, StoreError> {
    match record {
        Value::Object(object) => Ok(object),
        other => Err(StoreError::Fixture(format!("expected a JSON object, got {}", other))),
    }
}

fn now_stamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Missing and null sort before everything else.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(
        &self,
        collection: Collection,
        sort: Option<SortKey>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut records = self
            .collections
            .get(&collection)
            .map(|rows| rows.clone())
            .unwrap_or_default();

        if let Some(sort) = sort {
            records.sort_by(|a, b| {
                let ordering = compare_field(a.get(&sort.field), b.get(&sort.field));
                if sort.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        debug!("Listed {} {} records", records.len(), collection);
        Ok(records)
    }

    #[instrument(skip(self, record), fields(collection = %collection))]
    async fn create(&self, collection: Collection, record: Value) -> Result<Value, StoreError> {
        let mut object = into_object(record)?;
        let stamp = now_stamp();
        object.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        object.insert("created_date".into(), stamp.clone());
        object.insert("updated_date".into(), stamp);

        let created = Value::Object(object);
        self.collections.entry(collection).or_default().push(created.clone());
        Ok(created)
    }

    #[instrument(skip(self, patch), fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, StoreError> {
        let patch = into_object(patch)?;
        let not_found = || StoreError::NotFound {
            collection,
            id: id.to_string(),
        };

        let mut rows = self.collections.get_mut(&collection).ok_or_else(not_found)?;
        let record = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(not_found)?;

        if let Value::Object(object) = record {
            object.extend(patch);
            object.insert("updated_date".into(), now_stamp());
        }
        Ok(record.clone())
    }
}
