//! Command implementations.
//!
//! Each command plans its run over the registry, builds orchestrator units,
//! and returns the failure count for the exit status.

pub mod list;
pub mod pull;
pub mod rebase;
pub mod status;
pub mod switch;
pub mod update;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{Orchestrator, Unit};
use crate::repo::Registry;
use std::time::Duration;

/// Dispatch the parsed command. Returns the failure count.
pub async fn run(cli: &Cli, config: &Config, registry: &Registry) -> Result<usize> {
    match &cli.command {
        Commands::Switch { branch, all } => switch::run(registry, config, branch, *all).await,
        Commands::Pull { all } => pull::run(registry, config, *all).await,
        Commands::Rebase { all } => rebase::run(registry, config, *all).await,
        Commands::Update { all } => update::run(registry, config, *all).await,
        Commands::Status { short, all } => status::run(registry, config, *short, *all).await,
        Commands::List { all } => list::run(registry, *all).await,
    }
}

/// Run a set of units under the live view. Prints `idle_message` and
/// returns zero failures when nothing is active.
pub(crate) async fn run_view(
    title: &str,
    idle_message: &str,
    units: Vec<Unit>,
    config: &Config,
) -> Result<usize> {
    let mut orchestrator = Orchestrator::new(title, units)
        .with_tick(Duration::from_millis(config.render.tick_rate_ms));
    if !orchestrator.has_active() {
        println!("{}", idle_message);
        return Ok(0);
    }
    orchestrator.run().await
}
