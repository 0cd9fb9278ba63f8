//! Sequence-like access shared by search results and index listings.

use crate::error::{Result, SearchError};

/// Indexable, length-queryable collection of named rows.
///
/// Every method may trigger the implementor's lazy fetch, which is why they
/// all return [`Result`].
pub trait ResultSet {
    type Item: ?Sized;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Item at `index`; `Ok(None)` when the row exists but holds no data.
    fn get(&self, index: usize) -> Result<Option<&Self::Item>>;

    /// Position of the first row named `name`.
    fn index_of(&self, name: &str) -> Result<usize>;

    fn contains(&self, name: &str) -> Result<bool> {
        match self.index_of(name) {
            Ok(_) => Ok(true),
            Err(SearchError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
