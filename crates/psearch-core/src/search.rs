//! [`PartialSearch`] — a lazy, derivable query against one search index.
//!
//! A descriptor is built without any I/O. The first call that needs result
//! data issues `POST /search/{index}?q=…&rows=…&start=…` with the projection
//! as payload, and the decoded [`SearchPage`] is kept for the lifetime of the
//! descriptor. Derivations (`with_query`, `with_rows`, `with_start`, `slice`)
//! always return a fresh, unfetched descriptor and leave `self` untouched.
//!
//! The page lives in a write-once cell. Threads racing on the first access of
//! one shared descriptor may each issue a request; only the first page stored
//! is kept.

use crate::error::{Result, SearchError};
use crate::indexes::IndexList;
use crate::results::ResultSet;
use crate::transport::{Headers, Method, Transport};
use crate::types::{Data, Projection, SearchPage};
use serde_json::Value;
use std::ops::Range;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Root of the search API.
pub const SEARCH_URL: &str = "/search";
/// Query matching every document in an index.
pub const DEFAULT_QUERY: &str = "*:*";
pub const DEFAULT_ROWS: usize = 1000;

// ---------------------------------------------------------------------------
// Query arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchArgs {
    query: String,
    rows: usize,
    start: usize,
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            rows: DEFAULT_ROWS,
            start: 0,
        }
    }
}

/// `/search/{index}?q=…&rows=…&start=…`. The index name is form-encoded too,
/// so it cannot leak into the query string.
fn search_path(index: &str, args: &SearchArgs) -> String {
    let index: String = form_urlencoded::byte_serialize(index.as_bytes()).collect();
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("q", &args.query)
        .append_pair("rows", &args.rows.to_string())
        .append_pair("start", &args.start.to_string())
        .finish();
    format!("{SEARCH_URL}/{index}?{params}")
}

// ---------------------------------------------------------------------------
// PartialSearch
// ---------------------------------------------------------------------------

/// A partial search of one index.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use psearch_core::{PartialSearch, Projection, ResultSet, Transport};
/// # fn demo(transport: Arc<dyn Transport>) -> psearch_core::Result<()> {
/// let nodes = PartialSearch::new("node", transport)
///     .with_query("roles:app")
///     .with_projection(Projection::new().key("hostname", ["hostname"]));
///
/// for row in nodes.iter()? {
///     println!("{:?}", row.and_then(|data| data.get("hostname")));
/// }
/// # Ok(())
/// # }
/// ```
pub struct PartialSearch {
    index: String,
    args: SearchArgs,
    projection: Projection,
    path: String,
    transport: Arc<dyn Transport>,
    page: OnceLock<SearchPage>,
}

impl PartialSearch {
    /// Search `index` for everything (`*:*`), first 1000 rows, no projection.
    pub fn new(index: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::build(
            index.into(),
            SearchArgs::default(),
            Projection::default(),
            transport,
        )
    }

    fn build(
        index: String,
        args: SearchArgs,
        projection: Projection,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let path = search_path(&index, &args);
        Self {
            index,
            args,
            projection,
            path,
            transport,
            page: OnceLock::new(),
        }
    }

    fn derive(&self, args: SearchArgs, projection: Projection) -> Self {
        Self::build(
            self.index.clone(),
            args,
            projection,
            Arc::clone(&self.transport),
        )
    }

    // -- derivations --------------------------------------------------------

    pub fn with_query(&self, query: impl Into<String>) -> Self {
        let args = SearchArgs {
            query: query.into(),
            ..self.args.clone()
        };
        self.derive(args, self.projection.clone())
    }

    pub fn with_rows(&self, rows: usize) -> Self {
        let args = SearchArgs {
            rows,
            ..self.args.clone()
        };
        self.derive(args, self.projection.clone())
    }

    pub fn with_start(&self, start: usize) -> Self {
        let args = SearchArgs {
            start,
            ..self.args.clone()
        };
        self.derive(args, self.projection.clone())
    }

    pub fn with_projection(&self, projection: Projection) -> Self {
        self.derive(self.args.clone(), projection)
    }

    /// Add one projected key on top of the current projection.
    pub fn key<I, S>(&self, name: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_projection(self.projection.clone().key(name, path))
    }

    /// Shorthand for [`with_query`](Self::with_query).
    pub fn refine(&self, query: impl Into<String>) -> Self {
        self.with_query(query)
    }

    /// Sub-range `[start, stop)` of this search as a new lazy descriptor.
    ///
    /// Offsets are relative to this descriptor's own `start`. Only unit steps
    /// are supported; anything else is rejected before any request is made.
    pub fn slice(&self, start: usize, stop: usize, step: Option<isize>) -> Result<Self> {
        if let Some(step) = step.filter(|&s| s != 1) {
            return Err(SearchError::InvalidArgument(format!(
                "cannot use a step other than 1 (got {step})"
            )));
        }
        if stop < start {
            return Err(SearchError::InvalidArgument(format!(
                "slice stop {stop} is before start {start}"
            )));
        }
        let offset = self.args.start.checked_add(start).ok_or_else(|| {
            SearchError::InvalidArgument(format!(
                "slice start {start} overflows descriptor start {}",
                self.args.start
            ))
        })?;
        Ok(self.with_start(offset).with_rows(stop - start))
    }

    pub fn slice_range(&self, range: Range<usize>) -> Result<Self> {
        self.slice(range.start, range.end, None)
    }

    // -- accessors ----------------------------------------------------------

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn query(&self) -> &str {
        &self.args.query
    }

    pub fn rows(&self) -> usize {
        self.args.rows
    }

    pub fn start(&self) -> usize {
        self.args.start
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Request path including the encoded query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_fetched(&self) -> bool {
        self.page.get().is_some()
    }

    // -- data access --------------------------------------------------------

    /// The result page, fetched on first use.
    ///
    /// A failed request caches nothing; the next access tries again.
    pub fn page(&self) -> Result<&SearchPage> {
        if let Some(page) = self.page.get() {
            trace!(path = %self.path, "search page already fetched");
            return Ok(page);
        }

        debug!(index = %self.index, path = %self.path, keys = self.projection.len(), "fetching search page");
        let payload = self.projection.to_value();
        let reply = self
            .transport
            .request(Method::Post, &self.path, &Headers::new(), Some(&payload))?;
        let page = SearchPage::from_value(reply)?;
        debug!(total = page.total, rows = page.rows.len(), "search page fetched");

        Ok(self.page.get_or_init(|| page))
    }

    /// Total matches reported by the server, across all pages.
    pub fn total(&self) -> Result<u64> {
        Ok(self.page()?.total)
    }

    /// Row data in server order; `None` for null rows.
    pub fn iter(&self) -> Result<impl Iterator<Item = Option<&Data>>> {
        Ok(self
            .page()?
            .rows
            .iter()
            .map(|row| row.as_ref().map(|row| &row.data)))
    }

    /// `(object name, data)` for every row.
    pub fn rows_with_names(&self) -> Result<impl Iterator<Item = (Option<&str>, Option<&Data>)>> {
        Ok(self.page()?.rows.iter().map(|row| match row {
            Some(row) => (row.name(), Some(&row.data)),
            None => (None, None),
        }))
    }

    /// Data of the first row whose object is named `name`.
    pub fn get_named(&self, name: &str) -> Result<Option<&Data>> {
        let index = self.index_of(name)?;
        self.get(index)
    }

    /// Names of the indexes the server exposes (`GET /search`).
    ///
    /// Always hits the network; the listing is not cached.
    pub fn list_indexes(transport: Arc<dyn Transport>) -> Result<IndexList> {
        debug!(path = SEARCH_URL, "listing search indexes");
        let reply = transport.request(Method::Get, SEARCH_URL, &Headers::new(), None)?;
        match reply {
            Value::Object(indexes) => Ok(IndexList::new(
                indexes.into_iter().map(|(name, _)| name).collect(),
                transport,
            )),
            other => Err(SearchError::MalformedResponse(format!(
                "expected an object of index names, got {other}"
            ))),
        }
    }
}

impl ResultSet for PartialSearch {
    type Item = Data;

    fn len(&self) -> Result<usize> {
        Ok(self.page()?.rows.len())
    }

    fn get(&self, index: usize) -> Result<Option<&Data>> {
        let rows = &self.page()?.rows;
        match rows.get(index) {
            Some(row) => Ok(row.as_ref().map(|row| &row.data)),
            None => Err(SearchError::IndexOutOfRange {
                index,
                len: rows.len(),
            }),
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.page()?
            .rows
            .iter()
            .position(|row| row.as_ref().and_then(|row| row.name()) == Some(name))
            .ok_or_else(|| SearchError::NotFound {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for PartialSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialSearch")
            .field("index", &self.index)
            .field("query", &self.args.query)
            .field("rows", &self.args.rows)
            .field("start", &self.args.start)
            .field("projection", &self.projection)
            .field("fetched", &self.is_fetched())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
