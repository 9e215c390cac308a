//! Per-repository operation planning.
//!
//! Planning decides, before anything runs, which concrete branch each
//! repository targets and which repositories sit a run out. Target
//! resolution walks a fallback chain: the requested name, then its derived
//! version token, then the configured fallback branch; the first candidate
//! existing in that repository wins. An unresolvable target is a
//! configuration error, not a skip. Planning never mutates shared state, so
//! all repositories are planned concurrently.

use crate::error::{FleetError, Result};
use crate::repo::Repository;
use crate::version::{RemotePolicy, derive_version, is_version_branch, sort_branches};
use futures::future::try_join_all;
use std::sync::Arc;

/// What planning decided for one repository.
#[derive(Debug)]
pub enum Action<T> {
    Run(T),
    Skip { reason: String },
}

/// One repository's slot in a run plan, in display order.
#[derive(Debug)]
pub struct PlanEntry<T> {
    pub repo: Arc<Repository>,
    pub action: Action<T>,
}

/// Pull: integrate `branch` from `remote` into the checkout.
#[derive(Debug)]
pub struct PullTarget {
    pub branch: String,
    pub remote: String,
}

/// Rebase: integrate the derived `base` from `remote` into the checkout.
#[derive(Debug)]
pub struct RebaseTarget {
    pub base: String,
    pub remote: String,
}

/// Update: bring `branches` (newest first) up to date; `current` is the
/// branch checked out before the run began.
#[derive(Debug)]
pub struct UpdateTarget {
    pub branches: Vec<String>,
    pub current: String,
}

/// Pick the first candidate of requested -> derived version -> fallback that
/// exists in `branches`.
pub fn pick_target(branches: &[String], requested: &str, fallback: &str) -> Option<String> {
    let version = derive_version(requested);
    for candidate in [requested, version.as_str(), fallback] {
        if branches.iter().any(|b| b == candidate) {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Resolve the concrete target branch for one repository, or fail planning.
pub async fn resolve_target(repo: &Repository, requested: &str, fallback: &str) -> Result<String> {
    let branches = repo.branches().await?;
    pick_target(branches, requested, fallback).ok_or_else(|| FleetError::Planning {
        repo: repo.name().to_string(),
        target: requested.to_string(),
    })
}

/// Plan a switch: resolve each repository's target, skipping repositories
/// already on it.
pub async fn plan_switch(
    repos: &[Arc<Repository>],
    requested: &str,
    fallback: &str,
) -> Result<Vec<PlanEntry<String>>> {
    try_join_all(repos.iter().map(|repo| {
        let repo = repo.clone();
        async move {
            let target = resolve_target(&repo, requested, fallback).await?;
            let action = if repo.current_branch().await? == target {
                Action::Skip {
                    reason: format!("already on '{}'", target),
                }
            } else {
                Action::Run(target)
            };
            Ok(PlanEntry { repo, action })
        }
    }))
    .await
}

/// Plan a pull of each repository's current branch.
pub async fn plan_pull(
    repos: &[Arc<Repository>],
    policy: &RemotePolicy,
) -> Result<Vec<PlanEntry<PullTarget>>> {
    try_join_all(repos.iter().map(|repo| {
        let repo = repo.clone();
        let policy = policy.clone();
        async move {
            if !repo.has_remote() {
                return Ok(PlanEntry {
                    repo,
                    action: Action::Skip {
                        reason: "no remote found".to_string(),
                    },
                });
            }
            let current = repo.current_branch().await?;
            let action = if !is_version_branch(&current) {
                Action::Skip {
                    reason: "not on version branch".to_string(),
                }
            } else {
                Action::Run(PullTarget {
                    remote: policy.remote_for(&current).to_string(),
                    branch: current,
                })
            };
            Ok(PlanEntry { repo, action })
        }
    }))
    .await
}

/// Plan a rebase of each repository's current branch onto its version base.
pub async fn plan_rebase(
    repos: &[Arc<Repository>],
    canonical_remote: &str,
) -> Result<Vec<PlanEntry<RebaseTarget>>> {
    try_join_all(repos.iter().map(|repo| {
        let repo = repo.clone();
        let remote = canonical_remote.to_string();
        async move {
            if !repo.has_remote() {
                return Ok(PlanEntry {
                    repo,
                    action: Action::Skip {
                        reason: "no remote found".to_string(),
                    },
                });
            }
            let current = repo.current_branch().await?;
            let base = derive_version(&current);
            let action = if current == base {
                Action::Skip {
                    reason: "already on that base".to_string(),
                }
            } else {
                Action::Run(RebaseTarget { base, remote })
            };
            Ok(PlanEntry { repo, action })
        }
    }))
    .await
}

/// Plan an update of every version branch in every repository, newest first.
/// Repositories with no version branches are left out of the plan entirely.
pub async fn plan_update(repos: &[Arc<Repository>]) -> Result<Vec<PlanEntry<UpdateTarget>>> {
    let entries = try_join_all(repos.iter().map(|repo| {
        let repo = repo.clone();
        async move {
            if !repo.has_remote() {
                return Ok(Some(PlanEntry {
                    repo,
                    action: Action::Skip {
                        reason: "no remote found".to_string(),
                    },
                }));
            }
            let mut branches: Vec<String> = repo
                .branches()
                .await?
                .iter()
                .filter(|b| is_version_branch(b))
                .cloned()
                .collect();
            if branches.is_empty() {
                return Ok::<_, FleetError>(None);
            }
            sort_branches(&mut branches);
            let current = repo.current_branch().await?;
            Ok(Some(PlanEntry {
                repo,
                action: Action::Run(UpdateTarget { branches, current }),
            }))
        }
    }))
    .await?;
    Ok(entries.into_iter().flatten().collect())
}
