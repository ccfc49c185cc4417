//! Upstream doubles shared by the listener tests.

use async_trait::async_trait;
use lib_common::sources::reddit::{Credential, RankedItem, RedditError, TopItems, TopItemsSource};
use serde_json::json;

/// Always returns the same three-item listing.
pub struct StaticSource;

#[async_trait]
impl TopItemsSource for StaticSource {
    async fn authenticate(&self) -> Result<Credential, RedditError> {
        Ok(Credential::new("token"))
    }

    async fn fetch_top_items(&self, _credential: &Credential) -> Result<TopItems, RedditError> {
        let items = ["u1", "u2", "u1"]
            .iter()
            .map(|a| RankedItem::new(json!({"kind": "t3", "data": {"author": a, "title": "t"}})))
            .collect();
        Ok(TopItems { items, rate_limit: None })
    }
}

/// Rejects every authentication.
pub struct FailingSource;

#[async_trait]
impl TopItemsSource for FailingSource {
    async fn authenticate(&self) -> Result<Credential, RedditError> {
        Err(RedditError::Auth("invalid_grant".to_string()))
    }

    async fn fetch_top_items(&self, _credential: &Credential) -> Result<TopItems, RedditError> {
        Err(RedditError::Network("unreachable".to_string()))
    }
}
