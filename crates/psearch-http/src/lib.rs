//! psearch-http — blocking HTTP transport for psearch.
//!
//! [`HttpTransport`] implements [`psearch_core::Transport`] on top of hyper's
//! pooled client. Each transport owns a current-thread tokio runtime and
//! blocks the caller on it, so descriptors stay fully synchronous.
//!
//! Do not call it from inside another tokio runtime; `block_on` panics there.

pub mod client;

pub use client::HttpTransport;
