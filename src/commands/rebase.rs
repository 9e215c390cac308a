//! Rebase the current branch of every repository onto its version base.
//!
//! When the rebase stops on conflicts the failure carries the conflicted
//! paths so the view can render them under the repository line.

use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::orchestrator::{Unit, boxed_op};
use crate::plan::{self, Action};
use crate::repo::{Registry, Repository};
use crate::style;
use std::sync::Arc;

pub async fn run(registry: &Registry, config: &Config, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let entries = plan::plan_rebase(&repos, &config.remotes.canonical).await?;

    let mut units = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.action {
            Action::Skip { reason } => {
                units.push(Unit::skipped(entry.repo.name(), entry.repo.color(), reason));
            }
            Action::Run(target) => {
                let repo = entry.repo.clone();
                let base = target.base.clone();
                let remote = target.remote;
                units.push(Unit::single(
                    entry.repo.name(),
                    entry.repo.color(),
                    boxed_op(async move { rebase_onto(repo, remote, base).await }),
                    format!("rebasing on '{}'", target.base),
                    format!("rebased on '{}'", target.base),
                    format!("failed to rebase on '{}'", target.base),
                ));
            }
        }
    }

    super::run_view("Rebasing branches", "Nothing to rebase.", units, config).await
}

/// Integrate the base branch; when that stops, look for conflict entries and
/// report them over the raw git error.
async fn rebase_onto(repo: Arc<Repository>, remote: String, base: String) -> Result<()> {
    let Err(err) = repo.integrate_onto_upstream(&remote, &base).await else {
        return Ok(());
    };

    let conflicts: Vec<String> = repo
        .status()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry.len() >= 2 && style::is_conflict_code(&entry[..2]))
        .collect();

    if conflicts.is_empty() {
        Err(err)
    } else {
        Err(FleetError::RebaseConflicts {
            branch: base,
            conflicts,
        })
    }
}
