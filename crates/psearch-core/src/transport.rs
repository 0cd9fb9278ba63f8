//! The transport seam between descriptors and the remote search service.
//!
//! Authentication, request signing and connection management all live behind
//! [`Transport`]; the core only ever asks for one JSON reply per call.

use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Extra request headers for a single call.
pub type Headers = BTreeMap<String, String>;

/// HTTP method of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated client for the remote service.
///
/// Implementations block until the reply is available. `path` is relative to
/// the service root and already carries its query string.
pub trait Transport: Send + Sync {
    fn request(
        &self,
        method: Method,
        path: &str,
        headers: &Headers,
        payload: Option<&Value>,
    ) -> Result<Value, TransportError>;
}

/// Failure of a single transport call. Callers propagate it as-is.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built (bad URL, header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
