//! Command handlers. One module per top-level command.

pub mod serve;
pub mod status;
pub mod voices;
