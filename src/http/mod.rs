//! HTTP source module
//!
//! Walks JSON APIs that page their results.
//!
//! # Features
//!
//! - **Page number and offset**: `?page=2&limit=50`, `?offset=50&limit=50`
//! - **Keyset**: `?limit=50&starting_after=<last id>`
//! - **Response paths**: records and total located by dot path

mod client;
pub mod extract;
mod source;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use source::HttpSource;

#[cfg(test)]
mod tests;
