//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`.
//! Requests are built relative to a base URL, authenticated per call, and the
//! response comes back as an [`ApiResponse`] carrying the headers alongside the
//! decoded JSON body so callers can inspect metadata such as rate limits.

use reqwest::{header::HeaderMap, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failures raised by [`ApiClient`] before a usable response exists.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or the joined request path could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The request could not be built, sent, or its body could not be read.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response arrived but its body did not decode into the expected type.
    #[error("failed to decode response body (status {status}): {source}")]
    Decode {
        /// HTTP status of the response whose body failed to decode.
        status: u16,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Authentication attached to a single request.
#[derive(Debug, Clone, Copy)]
pub enum ApiAuth<'a> {
    /// No `Authorization` header.
    None,
    /// HTTP basic authentication (`Authorization: Basic base64(user:pass)`).
    Basic {
        /// Basic-auth user name.
        username: &'a str,
        /// Basic-auth password.
        password: &'a str,
    },
    /// Bearer token authentication.
    Bearer(&'a str),
}

/// How a request body is encoded on the wire.
#[derive(Debug)]
pub enum RequestBody<B> {
    /// `application/json`
    Json(B),
    /// `application/x-www-form-urlencoded`
    Form(B),
}

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// A flexible asynchronous HTTP client.
///
/// One instance is shared by all callers; `reqwest::Client` pools connections
/// internally and is cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://oauth.reddit.com/").
    /// * `user_agent` - Sent as the `User-Agent` header on every request.
    ///
    /// # Errors
    /// Returns [`ApiError::Url`] if `base_url` is not an absolute URL and
    /// [`ApiError::Transport`] if the TLS backend cannot be initialised.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        let inner = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self { inner, base_url })
    }

    /// The base URL relative paths are joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a generic HTTP request and handles the response.
    ///
    /// `path` is joined onto the base URL, so an absolute URL can be passed to
    /// reach a different host with the same client. Non-2xx responses are not
    /// errors: they come back with `success == false` and the raw body in
    /// `error_body`.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, POST, etc.).
    /// * `path` - The relative (or absolute) path to request.
    /// * `auth` - Authentication for this request only.
    /// * `query` - Optional query-string pairs.
    /// * `body` - Optional body, JSON or form encoded.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if URL joining, network execution or decoding of
    /// a successful body fails.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        auth: ApiAuth<'_>,
        query: Option<&[(&str, &str)]>,
        body: Option<RequestBody<B>>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let full_url = self.base_url.join(path)?;
        let mut req = self.inner.request(method, full_url);

        req = match auth {
            ApiAuth::None => req,
            ApiAuth::Basic { username, password } => req.basic_auth(username, Some(password)),
            ApiAuth::Bearer(token) => req.bearer_auth(token),
        };

        if let Some(pairs) = query {
            req = req.query(pairs);
        }

        req = match body {
            Some(RequestBody::Json(b)) => req.json(&b),
            Some(RequestBody::Form(b)) => req.form(&b),
            None => req,
        };

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        if status.is_success() {
            let bytes = response.bytes().await?;
            let data = serde_json::from_slice::<T>(&bytes).map_err(|source| ApiError::Decode {
                status: status.as_u16(),
                source,
            })?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers,
            })
        } else {
            // Keep the error body for diagnostics; an unreadable one is not fatal.
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers,
            })
        }
    }
}
