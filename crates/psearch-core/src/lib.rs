//! psearch-core — lazy partial search over a configuration-management
//! server's search index.
//!
//! A [`PartialSearch`] describes one query against one index (`node`, `role`,
//! `environment`, …). Building and deriving descriptors never touches the
//! network; the first access to the results performs a single request through
//! the injected [`Transport`] and the page is memoized for the lifetime of the
//! descriptor.
//!
//! # Architecture
//!
//! ```text
//! PartialSearch ──► Transport::request ──► SearchPage (cached once)
//!       │
//!       └──► with_query / with_rows / with_start / slice ──► new PartialSearch
//! ```
//!
//! The transport is a trait so the HTTP implementation (`psearch-http`) and
//! in-memory test doubles plug into the same seam.

pub mod config;
pub mod error;
pub mod indexes;
pub mod results;
pub mod search;
pub mod transport;
pub mod types;

pub use error::{Result, SearchError};
pub use indexes::IndexList;
pub use results::ResultSet;
pub use search::{PartialSearch, DEFAULT_QUERY, DEFAULT_ROWS, SEARCH_URL};
pub use transport::{Headers, Method, Transport, TransportError};
pub use types::{Data, Projection, SearchPage, SearchRow};
