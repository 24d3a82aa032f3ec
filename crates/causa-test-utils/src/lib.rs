//! Shared test utilities for the causa workspace.
//!
//! Provides the [`TestWorkspace`] tempdir fixture used across crate test
//! suites. Dev-dependency only — never published.

pub mod workspace;

pub use workspace::TestWorkspace;
