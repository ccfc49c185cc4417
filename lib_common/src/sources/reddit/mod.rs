//! # Reddit Source
//!
//! Everything needed to turn the Reddit API into a [`BroadcastPayload`]:
//!
//! - **`apicallreddit`**: the [`RedditClient`] (credential exchange, top listing,
//!   rate-limit handling) and the [`TopItemsSource`] seam it implements.
//! - **`topcontributors`**: pure ranking of listing authors.
//! - **`model`**: credential, item, rate-limit and payload types.
//! - **`error`**: the [`RedditError`] taxonomy.

/// Reddit API client and the `TopItemsSource` trait.
pub mod apicallreddit;
/// Error taxonomy for upstream calls.
pub mod error;
/// Data model shared by the client, the ranking and the push payload.
pub mod model;
/// Top-contributor ranking.
pub mod topcontributors;

pub use apicallreddit::{RedditClient, RedditConfig, TopItemsSource};
pub use error::RedditError;
pub use model::{BroadcastPayload, ContributorCount, Credential, RankedItem, RateLimitStatus, TopItems};
pub use topcontributors::rank_contributors;
