//! Remote object-storage bucket backend.
//!
//! Speaks the Google Cloud Storage JSON API over HTTP: `alt=media`
//! downloads and `uploadType=media` uploads, object name = hex key.
//! An endpoint override makes it usable against API-compatible stores
//! and test servers.

use async_trait::async_trait;

use crate::cache::{self, CacheError, CacheStore};
use crate::config::ObjectStoreConfig;
use crate::fingerprint::Fingerprint;

const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Object-storage cache store.
pub struct ObjectStore {
    config: ObjectStoreConfig,
    client: reqwest::Client,
}

impl ObjectStore {
    pub fn new(config: ObjectStoreConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> &str {
        self.config.url.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    fn download_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{key}?alt=media",
            self.endpoint().trim_end_matches('/'),
            self.config.bucket,
        )
    }

    fn upload_url(&self, key: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={key}",
            self.endpoint().trim_end_matches('/'),
            self.config.bucket,
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CacheStore for ObjectStore {
    async fn find(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        let url = self.download_url(&cache::entry_key(fingerprint));
        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.bytes().await?.to_vec())),
            status => Err(CacheError::UnexpectedStatus { status, url }),
        }
    }

    async fn save(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<(), CacheError> {
        let url = self.upload_url(&cache::entry_key(fingerprint));
        let response = self
            .authorize(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CacheError::UnexpectedStatus { status, url })
        }
    }
}
