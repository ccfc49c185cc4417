//! # Data Ingestors Module
//!
//! Ingestors pull data from an upstream source on a schedule and hand it to a
//! downstream consumer.
//!
//! ## Contained Modules:
//! - **`reddit_polling`**: one polling session per connected client. Each
//!   session fetches the Reddit top listing immediately, then on a fixed
//!   period, and pushes a `BroadcastPayload` to its own client until it is
//!   disconnected.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Per-connection polling sessions for the Reddit listing.
pub mod reddit_polling;

pub use reddit_polling::{
    ConnectionSession, CycleError, CycleOutcome, LogObserver, PayloadSink, PushError, SessionHandle,
    SessionObserver, SessionState,
};
