//! # lib_common
//!
//! Shared building blocks for the Reddit relay. Each folder is gated behind a
//! cargo feature of the same name so binaries only compile what they use.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP retrieval clients.
#[cfg(feature = "retrieve")]
pub mod retrieve;

/// Upstream content sources (Reddit) and the aggregates derived from them.
#[cfg(feature = "sources")]
pub mod sources;

/// Polling sessions that feed upstream snapshots to connected clients.
#[cfg(feature = "ingestors")]
pub mod ingestors;
