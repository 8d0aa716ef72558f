//! HTTP request handlers for the Axum web server.
//!
//! Each submodule contains handlers for one API area. Handlers are thin
//! wrappers over the services held in `AxumContext`.

pub mod progress;
pub mod sessions;
pub mod speech;
pub mod status;
pub mod voices;
