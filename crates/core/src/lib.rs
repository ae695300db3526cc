//! Domain core for the onboarding flow service.
//!
//! Page definitions and their editor, the wizard state machine that collects
//! submissions, the report projector, and the persistence gateway traits the
//! other crates implement.

pub mod editor;
pub mod error;
pub mod gateway;
pub mod page;
pub mod report;
pub mod session;
pub mod submission;
pub mod types;
pub mod wizard;
