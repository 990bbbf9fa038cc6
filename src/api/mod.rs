//! REST wrapper for the backend service.
//!
//! One call performs one HTTP request: the URL is the configured base plus
//! the endpoint plus an urlencoded query string, the body (if any) is JSON,
//! and the response is parsed as JSON into the caller's type.
//!
//! Failures surface as [`Error::Request`] carrying the backend's `message`
//! or `HTTP <status>`. Nothing is retried here; retry policy lives with the
//! caller or the [`query`](crate::query) client.

mod client;
mod error;
mod options;

pub use client::{ApiClient, FALLBACK_ERROR_MESSAGE};
pub use error::{Error, Result};
pub use options::{FetchOptions, ParamValue, QueryParams};
