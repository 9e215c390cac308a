//! Bring every version branch of every repository up to date, newest first.
//!
//! The checked-out branch is pulled with a rebase; every other version
//! branch gets its local ref fast-forwarded by a fetch, without touching the
//! checkout. Branches run strictly one at a time per repository; a failed
//! branch abandons the rest of that repository's queue.

use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::orchestrator::{Step, Unit};
use crate::plan::{self, Action};
use crate::repo::Registry;

pub async fn run(registry: &Registry, config: &Config, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let entries = plan::plan_update(&repos).await?;
    let remote = config.remotes.canonical.clone();

    let mut units = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.action {
            Action::Skip { reason } => {
                units.push(Unit::skipped(entry.repo.name(), entry.repo.color(), reason));
            }
            Action::Run(target) => {
                let count = target.branches.len();
                let steps: Vec<Step> = target
                    .branches
                    .into_iter()
                    .map(|branch| {
                        let repo = entry.repo.clone();
                        let remote = remote.clone();
                        let checked_out = branch == target.current;
                        Step::new(branch.clone(), async move {
                            let result = if checked_out {
                                repo.integrate_onto_upstream(&remote, &branch).await
                            } else {
                                repo.fetch_into_local(&remote, &branch).await
                            };
                            result.map_err(|e| {
                                FleetError::Git(format!("failed to fetch {}: {}", branch, e))
                            })
                        })
                    })
                    .collect();
                units.push(Unit::steps(
                    entry.repo.name(),
                    entry.repo.color(),
                    steps,
                    "fetching",
                    format!("{} branches", count),
                    "failed to update",
                ));
            }
        }
    }

    super::run_view(
        "Updating repositories",
        "No repositories to update.",
        units,
        config,
    )
    .await
}
