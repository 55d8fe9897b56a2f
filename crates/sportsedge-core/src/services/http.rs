//! HTTP client for the SportsEdge backend.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET  users/{id}/subscription` -> `{ "hasPremium": bool }`
//! - `GET  users/{id}/views`        -> [`ViewCount`]
//! - `POST users/{id}/views`        -> [`ViewCount`]
//! - `GET  rewards/structure[?userId=]` -> `[RewardTier]`

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::traits::{RewardStructureProvider, SubscriptionLookup, ViewCounter};
use crate::access::ViewCount;
use crate::error::ServiceError;
use crate::rewards::RewardTier;
use crate::storage::ApiConfig;

const USER_AGENT: &str = concat!("sportsedge/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionRecord {
    has_premium: bool,
}

/// Backend API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, ServiceError> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ServiceError::Transport {
                service: "client",
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::Unavailable("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        builder: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let resp = builder
            .send()
            .await
            .map_err(|source| ServiceError::Transport { service, source })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ServiceError::NotAuthenticated { service });
        }
        if !status.is_success() {
            return Err(ServiceError::UnexpectedStatus {
                service,
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| ServiceError::Transport { service, source })?;
        serde_json::from_str(&body).map_err(|e| ServiceError::Decode {
            service,
            message: e.to_string(),
        })
    }
}

impl SubscriptionLookup for ApiClient {
    async fn has_premium_access(&self, user_id: &str) -> Result<bool, ServiceError> {
        let url = self.endpoint(&["users", user_id, "subscription"])?;
        tracing::debug!(%url, "checking subscription");
        let record: SubscriptionRecord = self
            .send_json("subscription", self.request(Method::GET, url))
            .await?;
        Ok(record.has_premium)
    }
}

impl ViewCounter for ApiClient {
    async fn user_view_count(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        let url = self.endpoint(&["users", subject, "views"])?;
        self.send_json("view-count", self.request(Method::GET, url))
            .await
    }

    async fn record_view(&self, subject: &str) -> Result<ViewCount, ServiceError> {
        let url = self.endpoint(&["users", subject, "views"])?;
        self.send_json("view-count", self.request(Method::POST, url))
            .await
    }
}

impl RewardStructureProvider for ApiClient {
    async fn reward_structure(&self, user_id: Option<&str>) -> Result<Vec<RewardTier>, ServiceError> {
        let mut url = self.endpoint(&["rewards", "structure"])?;
        if let Some(user_id) = user_id {
            url.query_pairs_mut().append_pair("userId", user_id);
        }
        self.send_json("reward-structure", self.request(Method::GET, url))
            .await
    }
}
