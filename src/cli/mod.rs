//! Command-line interface for gitfleet.

pub mod commands;

pub use commands::{Cli, Commands};
