//! End-to-end test scenarios for the causa workspace.
//!
//! The actual tests live in the `[[test]]` targets declared by this
//! package; this library target exists only so the package builds on
//! its own.
