//! # Data Retrieval Module
//!
//! Generic HTTP clients shared by every upstream source.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: An `ApiClient` built on `reqwest` that joins paths onto a
//!   base URL, attaches per-request authentication, and hands back the status,
//!   headers and decoded body together. It never retries; callers decide what a
//!   failure means for them.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client returning status, headers and decoded body together.
pub mod ky_http;
