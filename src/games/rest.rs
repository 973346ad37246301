//! PostgREST-backed games store.
//!
//! # Responsibilities
//! - Translate store operations into PostgREST requests on `/rest/v1/{table}`
//! - Authenticate every call with the service key
//! - Surface the store's error `message` on refusals
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` per store, built once at startup
//! - Writes ask for `return=representation` so the stored row comes back

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::StoreConfig;
use crate::games::store::{GameStore, StoreError, StoreResult};
use crate::games::types::{Game, GameId, GamePatch, NewGame, RELEASE_YEAR_COLUMN};

const RETURN_REPRESENTATION: &str = "return=representation";

/// Error object returned by PostgREST.
#[derive(Debug, Deserialize)]
struct RemoteError {
    message: String,
}

/// Games store speaking to a hosted PostgREST endpoint.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    endpoint: Url,
}

impl RestStore {
    /// Build a store client from configuration.
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let endpoint = format!(
            "{}/rest/v1/{}",
            config.url.trim_end_matches('/'),
            config.table
        );
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| StoreError::Config(format!("invalid store URL '{}': {}", config.url, e)))?;

        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::Config("API key is not a valid header value".into()))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::Config("API key is not a valid header value".into()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::info!(endpoint = %endpoint, "Games store client initialized");

        Ok(Self { client, endpoint })
    }

    /// Endpoint all requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn id_filter(id: GameId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RemoteError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("store responded with {}", status));
        tracing::debug!(status = %status, message = %message, "Store rejected request");

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Vec<T>> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GameStore for RestStore {
    async fn list(&self) -> StoreResult<Vec<Game>> {
        let order = format!("{}.desc", RELEASE_YEAR_COLUMN);
        let request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("select", "*"), ("order", order.as_str())]);
        self.rows(request).await
    }

    async fn get(&self, id: GameId) -> StoreResult<Option<Game>> {
        let request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("select", "*")])
            .query(&Self::id_filter(id));
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn insert(&self, game: NewGame) -> StoreResult<Game> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[game]);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::EmptyResponse)
    }

    async fn update(&self, id: GameId, patch: GamePatch) -> StoreResult<Option<Game>> {
        let request = self
            .client
            .patch(self.endpoint.clone())
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn delete(&self, id: GameId) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.endpoint.clone())
            .query(&Self::id_filter(id));
        self.send(request).await?;
        Ok(())
    }
}
