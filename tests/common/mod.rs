//! Shared test utilities for psearch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Everything here is synchronous; the fake HTTP server
//! keeps its async runtime on its own thread.

pub mod assertions;
pub mod fake_search_api;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
