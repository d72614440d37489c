use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::EntityStore;
use crate::config::BackendSettings;
use crate::error::StoreError;
use crate::hosted::{check_status, HostedApi};
use crate::models::{Collection, SortKey};

/// Entity store backed by the hosted REST API.
#[derive(Clone)]
pub struct HttpEntityStore {
    api: HostedApi,
}

impl HttpEntityStore {
    pub fn new(settings: &BackendSettings) -> Result<Self, StoreError> {
        Ok(Self::with_api(HostedApi::new(settings)?))
    }

    pub fn with_api(api: HostedApi) -> Self {
        Self { api }
    }

    fn collection_url(&self, collection: Collection) -> url::Url {
        self.api.endpoint(&["entities", collection.as_str()])
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let response = check_status(response)
        .await
        .map_err(|(status, body)| StoreError::Status { status, body })?;
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl EntityStore for HttpEntityStore {
    #[instrument(skip(self), fields(collection = %collection))]
    async fn list(
        &self,
        collection: Collection,
        sort: Option<SortKey>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut url = self.collection_url(collection);
        if let Some(sort) = &sort {
            url.query_pairs_mut().append_pair("sort", &sort.to_string());
        }

        let response = self.api.get(url).send().await?;
        let records: Vec<Value> = read_json(response).await.map_err(|e| {
            error!("Failed to list {}: {}", collection, e);
            e
        })?;

        debug!("Fetched {} {} records", records.len(), collection);
        Ok(records)
    }

    #[instrument(skip(self, record), fields(collection = %collection))]
    async fn create(&self, collection: Collection, record: Value) -> Result<Value, StoreError> {
        let response = self
            .api
            .post(self.collection_url(collection))
            .json(&record)
            .send()
            .await?;

        read_json(response).await.map_err(|e| {
            error!("Failed to create {}: {}", collection, e);
            e
        })
    }

    #[instrument(skip(self, patch), fields(collection = %collection, id = %id))]
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: Value,
    ) -> Result<Value, StoreError> {
        let url = self.api.endpoint(&["entities", collection.as_str(), id]);
        let response = self.api.put(url).json(&patch).send().await?;

        match read_json(response).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            }),
            Err(e) => {
                error!("Failed to update {} {}: {}", collection, id, e);
                Err(e)
            }
            ok => ok,
        }
    }
}
