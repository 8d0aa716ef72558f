//! `shadowme` command-line interface.
//!
//! Parses arguments and environment, composes the services and dispatches
//! to the command handlers.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

// Used by main.rs binary
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::init_logging;
pub use commands::{Commands, ServeArgs, SynthesisArgs, VoicesCommand};
pub use parser::Cli;
