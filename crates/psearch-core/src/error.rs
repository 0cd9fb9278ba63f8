//! Error type for search descriptors.

use crate::transport::TransportError;

pub type Result<T, E = SearchError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Rejected before any request is made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No row (or listed index) carries this name.
    #[error("{name} not in search")]
    NotFound { name: String },

    #[error("row {index} is out of range for a page of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    /// The reply did not have the `{total, rows}` shape.
    #[error("malformed search response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
