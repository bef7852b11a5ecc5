//! This module aggregates various utility submodules used throughout the application.

/// Utilities for interacting with the application's SQLite database.
pub(crate) mod database;
