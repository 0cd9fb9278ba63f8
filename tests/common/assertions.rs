//! Domain-specific assertion macros for psearch harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* row or *which* error broke the expectation.

// ---------------------------------------------------------------------------
// Row assertions
// ---------------------------------------------------------------------------

/// Assert the value of one projected field across every row of a search.
/// Null rows are compared as `null`.
///
/// ```rust
/// assert_field_values!(search, "hostname", ["web01", "web02", null]);
/// ```
#[macro_export]
macro_rules! assert_field_values {
    ($search:expr, $field:expr, [$($value:tt),* $(,)?]) => {{
        let search: &psearch_core::PartialSearch = &$search;
        let field: &str = $field;
        let actual: Vec<serde_json::Value> = search
            .iter()
            .unwrap_or_else(|e| panic!("assert_field_values! fetch failed: {e}"))
            .map(|row| match row {
                Some(data) => data.get(field).cloned().unwrap_or(serde_json::Value::Null),
                None => serde_json::Value::Null,
            })
            .collect();
        let expected: Vec<serde_json::Value> = vec![$(serde_json::json!($value)),*];
        pretty_assertions::assert_eq!(
            actual,
            expected,
            "assert_field_values! failed for field {:?} on {:?}",
            field,
            search
        );
    }};
}

// ---------------------------------------------------------------------------
// Error assertions
// ---------------------------------------------------------------------------

/// Assert that a result failed in the transport with the given HTTP status.
///
/// ```rust
/// assert_status!(search.total(), 503);
/// ```
#[macro_export]
macro_rules! assert_status {
    ($result:expr, $status:expr) => {{
        match $result {
            Err(psearch_core::SearchError::Transport(psearch_core::TransportError::Status {
                status,
                ..
            })) if status == $status => {}
            Err(other) => panic!(
                "assert_status! failed:\n  expected: transport status {}\n  actual:   {:?}",
                $status, other
            ),
            Ok(_) => panic!(
                "assert_status! failed: expected transport status {}, call succeeded",
                $status
            ),
        }
    }};
}
