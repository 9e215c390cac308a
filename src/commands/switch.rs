//! Switch every repository to a requested branch.
//!
//! The concrete branch per repository comes from the plan fallback chain:
//! requested name, then its derived version, then the configured fallback.
//! An unresolvable target aborts before any repository is touched.

use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{Unit, boxed_op};
use crate::plan::{self, Action};
use crate::repo::Registry;

pub async fn run(registry: &Registry, config: &Config, branch: &str, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let entries = plan::plan_switch(&repos, branch, &config.fallback_branch).await?;

    let mut units = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.action {
            Action::Skip { reason } => {
                units.push(Unit::skipped(entry.repo.name(), entry.repo.color(), reason));
            }
            Action::Run(target) => {
                let repo = entry.repo.clone();
                let branch = target.clone();
                units.push(Unit::single(
                    entry.repo.name(),
                    entry.repo.color(),
                    boxed_op(async move { repo.switch_to(&branch).await }),
                    format!("switching to '{}'", target),
                    format!("switched to '{}'", target),
                    format!("failed to switch to '{}'", target),
                ));
            }
        }
    }

    super::run_view("Switching branches", "Nothing to switch.", units, config).await
}
