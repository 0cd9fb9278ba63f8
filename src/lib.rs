//! psearch — partial search over a configuration-management server's index.
//!
//! The binary is a thin composition layer: it loads the config, builds the
//! single [`psearch_http::HttpTransport`] for the process and hands it to
//! [`cli::run`]. The descriptor logic lives in `psearch-core`.
//!
//! ```text
//! Config ──► HttpTransport ──► PartialSearch ──► stdout (JSON lines)
//! ```

pub mod cli;
