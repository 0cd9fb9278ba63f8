//! [`IndexList`] — the names returned by [`PartialSearch::list_indexes`].

use crate::error::{Result, SearchError};
use crate::results::ResultSet;
use crate::search::PartialSearch;
use crate::transport::Transport;
use std::sync::Arc;

/// Index names known to the server, plus the transport that listed them so a
/// name can be turned straight into a search.
pub struct IndexList {
    names: Vec<String>,
    transport: Arc<dyn Transport>,
}

impl IndexList {
    pub(crate) fn new(names: Vec<String>, transport: Arc<dyn Transport>) -> Self {
        Self { names, transport }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// A default `*:*` search over the listed index `name`.
    pub fn search(&self, name: &str) -> Result<PartialSearch> {
        self.index_of(name)?;
        Ok(PartialSearch::new(name, Arc::clone(&self.transport)))
    }
}

impl ResultSet for IndexList {
    type Item = str;

    fn len(&self) -> Result<usize> {
        Ok(self.names.len())
    }

    fn get(&self, index: usize) -> Result<Option<&str>> {
        self.names
            .get(index)
            .map(|name| Some(name.as_str()))
            .ok_or(SearchError::IndexOutOfRange {
                index,
                len: self.names.len(),
            })
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| SearchError::NotFound {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for IndexList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.names).finish()
    }
}
