//! Row structs for the document tables.
//!
//! Each submodule contains a `FromRow` struct matching the table and the
//! conversion into the core domain type.

pub mod page;
pub mod submission;
