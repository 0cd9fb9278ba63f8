//! Wire types for psearch-core.
//!
//! This module defines the shapes exchanged with the search endpoint: the
//! [`Projection`] sent as the request payload, and the [`SearchPage`] /
//! [`SearchRow`] returned for each query.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Projected fields of a single matched document.
pub type Data = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Partial-search projection: output key → path of segments into the
/// matched document.
///
/// Serialized as a plain JSON object, e.g.
/// `{"ip": ["network", "ipaddress"], "roles": ["roles"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection(BTreeMap<String, Vec<String>>);

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an output key, builder style.
    pub fn key<I, S>(mut self, name: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, path);
        self
    }

    pub fn insert<I, S>(&mut self, name: impl Into<String>, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(name.into(), path.into_iter().map(Into::into).collect());
    }

    /// Parse a `name=seg.seg.seg` pair as typed on the command line.
    ///
    /// A pair without `=` projects a top-level key onto itself, so `roles`
    /// is shorthand for `roles=roles`.
    pub fn parse_pair(input: &str) -> Result<(String, Vec<String>), SearchError> {
        let input = input.trim();
        let (name, path) = input.split_once('=').unwrap_or((input, input));
        let (name, path) = (name.trim(), path.trim());

        if name.is_empty() || path.is_empty() {
            return Err(SearchError::InvalidArgument(format!(
                "projection key must look like name=path.to.field, got {input:?}"
            )));
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(SearchError::InvalidArgument(format!(
                "empty path segment in projection {input:?}"
            )));
        }
        Ok((name.to_string(), segments))
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The request payload for this projection.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(name, path)| (name.clone(), Value::from(path.clone())))
                .collect(),
        )
    }
}

impl<K, P, S> FromIterator<(K, P)> for Projection
where
    K: Into<String>,
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, P)>>(iter: T) -> Self {
        let mut projection = Projection::new();
        for (name, path) in iter {
            projection.insert(name, path);
        }
        projection
    }
}

// ---------------------------------------------------------------------------
// Result page
// ---------------------------------------------------------------------------

/// One page of search results as returned by the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchPage {
    /// Total number of matches in the index, not just on this page.
    pub total: u64,
    /// Rows in server order. `None` marks a document the server matched but
    /// could not resolve to data.
    pub rows: Vec<Option<SearchRow>>,
}

impl SearchPage {
    /// Decode a raw response body, reporting shape mismatches as
    /// [`SearchError::MalformedResponse`].
    pub fn from_value(value: Value) -> Result<Self, SearchError> {
        serde_json::from_value(value).map_err(|e| SearchError::MalformedResponse(e.to_string()))
    }
}

/// A resolved row of a partial search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchRow {
    /// API URL of the matched object, e.g. `https://chef/nodes/web01`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Projected fields.
    #[serde(default)]
    pub data: Data,
}

impl SearchRow {
    /// Name of the object this row was resolved from.
    ///
    /// Taken from the last segment of `url`; falls back to a string `name`
    /// field in `data` when the server sends no URL.
    pub fn name(&self) -> Option<&str> {
        self.url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .or_else(|| self.data.get("name").and_then(Value::as_str))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
