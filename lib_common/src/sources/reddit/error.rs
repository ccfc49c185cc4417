use thiserror::Error;

use crate::retrieve::ky_http::ApiError;

/// Failures of a single upstream call.
///
/// The client never swallows these; only the polling session decides that a
/// failed cycle is survivable.
#[derive(Debug, Error)]
pub enum RedditError {
    /// The credential exchange failed: rejected credentials, a token response
    /// without `access_token`, or a network failure during the exchange.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The upstream answered 2xx but the body did not have the expected shape.
    #[error("unexpected response structure: {0}")]
    Schema(String),

    /// Transport failure or a non-2xx status from the listing endpoint.
    #[error("network error: {0}")]
    Network(String),
}

impl RedditError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RedditError::Auth(_) => "auth",
            RedditError::Schema(_) => "schema",
            RedditError::Network(_) => "network",
        }
    }
}

impl From<ApiError> for RedditError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Decode { .. } => RedditError::Schema(err.to_string()),
            ApiError::Url(_) | ApiError::Transport(_) => RedditError::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_schema_errors() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err: RedditError = ApiError::Decode { status: 200, source }.into();
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn url_failures_are_network_errors() {
        let err: RedditError = ApiError::Url(url::ParseError::EmptyHost).into();
        assert_eq!(err.kind(), "network");
        assert!(err.to_string().starts_with("network error"));
    }
}
