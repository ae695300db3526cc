//! Repository layer for the document tables.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod page_repo;
pub mod submission_repo;

pub use page_repo::PageRepo;
pub use submission_repo::SubmissionRepo;
