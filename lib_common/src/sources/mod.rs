//! # Upstream Sources Module
//!
//! Clients for the content APIs the relay reads from, together with the data
//! models and aggregates derived from their responses.
//!
//! ## Contained Modules:
//!
//! - **`reddit`**: OAuth client-credentials authentication, the daily top
//!   listing with rate-limit self-throttling, and top-contributor ranking.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Reddit client, data model and contributor ranking.
pub mod reddit;
