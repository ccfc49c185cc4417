//! # Reddit API Client
//!
//! A dedicated client for the two Reddit calls the relay needs: the OAuth
//! client-credentials exchange and the daily top listing of `r/science`.
//!
//! ## Core Features:
//! - **Explicit configuration**: everything comes from a [`RedditConfig`]
//!   value handed to [`RedditClient::new`]; nothing is read from globals.
//! - **Shape validation**: a listing without an array at `data.children` is a
//!   [`RedditError::Schema`], never an empty list.
//! - **Self-throttling**: when the response says the rate-limit window is
//!   exhausted, the fetch holds back until the window resets before returning.
//!   This is not a retry; the data already arrived.
//! - **No retries, no caching**: failures go straight back to the caller and a
//!   fresh credential is expected for every cycle.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::fmt;

use crate::retrieve::ky_http::{ApiAuth, ApiClient, ApiError, RequestBody};

use super::error::RedditError;
use super::model::{Credential, RankedItem, RateLimitStatus, TopItems};

/// Reddit's OAuth token endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
/// Base URL for bearer-authenticated API calls.
pub const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com/";
/// User agent Reddit sees on every request.
pub const DEFAULT_USER_AGENT: &str = "RedditStatsApp/1.0";

/// Listing path, relative to the API base URL.
pub const TOP_LISTING_PATH: &str = "r/science/top";
/// Time window of the top listing.
pub const TOP_LISTING_WINDOW: &str = "day";
/// Number of items requested from the top listing.
pub const TOP_LISTING_LIMIT: u32 = 10;

/// Settings for [`RedditClient`].
#[derive(Clone)]
pub struct RedditConfig {
    /// OAuth application id.
    pub client_id: String,
    /// OAuth application secret.
    pub client_secret: String,
    /// Absolute URL of the token endpoint.
    pub oauth_url: String,
    /// Absolute base URL the listing path is joined onto.
    pub api_base_url: String,
    /// `User-Agent` for both calls.
    pub user_agent: String,
}

impl RedditConfig {
    /// Configuration pointing at the public Reddit endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("oauth_url", &self.oauth_url)
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Where polling sessions and read endpoints get their data from.
///
/// [`RedditClient`] is the production implementation; tests substitute their
/// own.
#[async_trait]
pub trait TopItemsSource: Send + Sync {
    /// Exchanges the configured credentials for a fresh bearer token.
    async fn authenticate(&self) -> Result<Credential, RedditError>;

    /// Fetches the ranked listing with a token from [`authenticate`](Self::authenticate).
    async fn fetch_top_items(&self, credential: &Credential) -> Result<TopItems, RedditError>;
}

/// Client for the Reddit OAuth and listing endpoints.
#[derive(Debug)]
pub struct RedditClient {
    client: ApiClient,
    config: RedditConfig,
}

impl RedditClient {
    /// Builds a client from explicit configuration.
    ///
    /// # Errors
    /// Fails if `api_base_url` is not an absolute URL or the HTTP stack cannot
    /// be initialised.
    pub fn new(mut config: RedditConfig) -> Result<Self, ApiError> {
        // Url::join replaces the last segment unless the base ends with '/'.
        if !config.api_base_url.ends_with('/') {
            config.api_base_url.push('/');
        }
        let client = ApiClient::new(&config.api_base_url, &config.user_agent)?;
        Ok(Self { client, config })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RedditConfig {
        &self.config
    }

    /// Exchanges the client id/secret for a bearer token.
    ///
    /// # Errors
    /// [`RedditError::Auth`] when the exchange fails for any reason. The caller
    /// decides whether to try again.
    pub async fn authenticate(&self) -> Result<Credential, RedditError> {
        let response = self
            .client
            .request::<Value, _>(
                Method::POST,
                &self.config.oauth_url,
                ApiAuth::Basic {
                    username: &self.config.client_id,
                    password: &self.config.client_secret,
                },
                None,
                Some(RequestBody::Form([("grant_type", "client_credentials")])),
            )
            .await
            .map_err(|e| RedditError::Auth(e.to_string()))?;

        if !response.success {
            return Err(RedditError::Auth(format!(
                "token endpoint returned status {}",
                response.status
            )));
        }

        // Reddit answers bad credentials with 200 and {"error": ...}.
        let token = response
            .data
            .as_ref()
            .and_then(|body| body.get("access_token"))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RedditError::Auth("token response has no access_token".to_string()))?;

        Ok(Credential::new(token))
    }

    /// Fetches the top [`TOP_LISTING_LIMIT`] items of the day.
    ///
    /// When the rate-limit window is exhausted, this holds back until the
    /// reported reset before returning (whatever the outcome of validation).
    ///
    /// # Errors
    /// - [`RedditError::Network`] on transport failure or a non-2xx status.
    /// - [`RedditError::Schema`] when the body is not JSON or lacks an array at
    ///   `data.children`.
    pub async fn fetch_top_items(&self, credential: &Credential) -> Result<TopItems, RedditError> {
        let limit = TOP_LISTING_LIMIT.to_string();
        let response = self
            .client
            .request::<Value, ()>(
                Method::GET,
                TOP_LISTING_PATH,
                ApiAuth::Bearer(credential.secret()),
                Some(&[("t", TOP_LISTING_WINDOW), ("limit", limit.as_str())]),
                None,
            )
            .await?;

        if !response.success {
            return Err(RedditError::Network(format!(
                "GET {} returned status {}",
                TOP_LISTING_PATH, response.status
            )));
        }

        let rate_limit = RateLimitStatus::from_headers(&response.headers);
        match rate_limit {
            Some(status) => log::debug!(
                "Rate limit remaining: {}, resets at epoch {}",
                status.remaining,
                status.reset_epoch_seconds
            ),
            None => log::debug!("No rate-limit headers on {}", TOP_LISTING_PATH),
        }

        let items = response
            .data
            .ok_or_else(|| RedditError::Schema("empty response body".to_string()))
            .and_then(extract_items);

        if let Some(status) = rate_limit {
            throttle(status).await;
        }

        Ok(TopItems {
            items: items?,
            rate_limit,
        })
    }
}

#[async_trait]
impl TopItemsSource for RedditClient {
    async fn authenticate(&self) -> Result<Credential, RedditError> {
        RedditClient::authenticate(self).await
    }

    async fn fetch_top_items(&self, credential: &Credential) -> Result<TopItems, RedditError> {
        RedditClient::fetch_top_items(self, credential).await
    }
}

/// Pulls the listing children out of `{"data": {"children": [...]}}`.
fn extract_items(mut body: Value) -> Result<Vec<RankedItem>, RedditError> {
    match body.pointer_mut("/data/children").map(Value::take) {
        Some(Value::Array(children)) => Ok(children.into_iter().map(RankedItem::from).collect()),
        Some(Value::Null) | None => Err(RedditError::Schema(
            "data.children is missing or null".to_string(),
        )),
        Some(other) => Err(RedditError::Schema(format!(
            "data.children is not an array (found {})",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

async fn throttle(status: RateLimitStatus) {
    let now = chrono::Utc::now().timestamp();
    if let Some(wait) = status.throttle_delay(now) {
        log::warn!(
            "Rate limit exhausted. Waiting {:.1} seconds before returning.",
            wait.as_secs_f64()
        );
        tokio::time::sleep(wait).await;
    }
}
