//! gitfleet - bulk git operations across a fleet of release-tracking
//! repositories.
//!
//! A fleet is a fixed set of working copies that follow the same release
//! branch naming. Commands plan one operation per repository, run the plans
//! concurrently, and track each repository on its own line of a live
//! terminal view.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod repo;
pub mod style;
pub mod version;

pub use error::{FleetError, Result};
