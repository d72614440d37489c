//! Shared plumbing for the hosted backend's REST endpoints.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use crate::config::BackendSettings;
use crate::error::StoreError;

const API_KEY_HEADER: &str = "api_key";

/// HTTP client bound to one hosted application.
#[derive(Clone)]
pub struct HostedApi {
    client: Client,
    base: Url,
    app_id: String,
    api_key: String,
}

impl HostedApi {
    pub fn new(settings: &BackendSettings) -> Result<Self, StoreError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| StoreError::InvalidBaseUrl(format!("{}: {}", settings.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            app_id: settings.app_id.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// `{base}/apps/{app_id}/{segments...}`
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("apps")
                .push(&self.app_id)
                .extend(segments);
        }
        url
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url).header(API_KEY_HEADER, &self.api_key)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url).header(API_KEY_HEADER, &self.api_key)
    }

    pub fn put(&self, url: Url) -> RequestBuilder {
        self.client.put(url).header(API_KEY_HEADER, &self.api_key)
    }
}

/// Splits a response into the success case and `(status, body)` for anything else.
pub async fn check_status(response: Response) -> Result<Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err((status.as_u16(), body))
}
