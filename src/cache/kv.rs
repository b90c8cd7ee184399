//! Remote key-value service backend.
//!
//! A plain HTTP key-value keyspace: `GET <url>/[<namespace>/]<key>`
//! returns the blob or 404, `PUT` stores it. Credentials, when set, go
//! out as basic auth.

use async_trait::async_trait;

use crate::cache::{self, CacheError, CacheStore};
use crate::config::KvConfig;
use crate::fingerprint::Fingerprint;

/// Key-value cache store.
pub struct KvStore {
    config: KvConfig,
    client: reqwest::Client,
}

impl KvStore {
    pub fn new(config: KvConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn key_url(&self, key: &str) -> String {
        let base = self.config.url.trim_end_matches('/');
        match &self.config.namespace {
            Some(namespace) => format!("{base}/{namespace}/{key}"),
            None => format!("{base}/{key}"),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.password {
            Some(password) => request.basic_auth("", Some(password)),
            None => request,
        }
    }
}

#[async_trait]
impl CacheStore for KvStore {
    async fn find(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, CacheError> {
        let url = self.key_url(&cache::entry_key(fingerprint));
        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.bytes().await?.to_vec())),
            status => Err(CacheError::UnexpectedStatus { status, url }),
        }
    }

    async fn save(&self, fingerprint: &Fingerprint, content: &[u8]) -> Result<(), CacheError> {
        let url = self.key_url(&cache::entry_key(fingerprint));
        let response = self
            .authorize(self.client.put(&url))
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
