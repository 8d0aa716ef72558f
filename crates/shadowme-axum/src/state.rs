//! Shared application state type.

use crate::bootstrap::AxumContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped `AxumContext` holding the orchestrator, the progress
/// service and the provider diagnostics.
pub type AppState = Arc<AxumContext>;
