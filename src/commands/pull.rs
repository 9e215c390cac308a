//! Pull (rebase) the current branch in every repository.
//!
//! Only repositories sitting on a version branch participate; the remote
//! comes from the configured remote policy.

use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{Unit, boxed_op};
use crate::plan::{self, Action};
use crate::repo::Registry;
use crate::version::RemotePolicy;

pub async fn run(registry: &Registry, config: &Config, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let policy = RemotePolicy::new(&config.remotes.canonical, &config.remotes.development);
    let entries = plan::plan_pull(&repos, &policy).await?;

    let mut units = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.action {
            Action::Skip { reason } => {
                units.push(Unit::skipped(entry.repo.name(), entry.repo.color(), reason));
            }
            Action::Run(target) => {
                let repo = entry.repo.clone();
                let branch = target.branch.clone();
                let remote = target.remote;
                units.push(Unit::single(
                    entry.repo.name(),
                    entry.repo.color(),
                    boxed_op(async move { repo.integrate_onto_upstream(&remote, &branch).await }),
                    format!("pulling '{}'", target.branch),
                    format!("pulled '{}'", target.branch),
                    format!("failed to pull '{}'", target.branch),
                ));
            }
        }
    }

    super::run_view(
        "Pulling branches",
        "No repositories on version branches to pull.",
        units,
        config,
    )
    .await
}
