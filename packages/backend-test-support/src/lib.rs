//! Backend test support utilities
//!
//! Shared helpers for the backend's unit and integration test binaries.
//! Currently this is just unified logging initialization.

pub mod logging;
