//! SQLite persistence for ShadowME.
//!
//! Implements the core [`ProgressRepository`](shadowme_core::ProgressRepository)
//! port and owns the schema bootstrap. The voice-clone cache is not persisted.
#![deny(unsafe_code)]

pub mod repositories;
pub mod setup;

// Re-export repository implementations
pub use repositories::SqliteProgressRepository;

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
