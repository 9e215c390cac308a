//! Show each repository's branch, ahead/behind counts and pending changes.
//!
//! Plain output, no live view. Repositories are inspected concurrently but
//! always printed in registry order. A branch with no upstream renders
//! dimmed instead of failing the run.

use crate::config::Config;
use crate::error::Result;
use crate::repo::{Registry, Repository};
use crate::style;
use crate::version::RemotePolicy;
use colored::Colorize;
use futures::future::join_all;

pub async fn run(registry: &Registry, config: &Config, short: bool, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let policy = RemotePolicy::new(&config.remotes.canonical, &config.remotes.development);

    let reports = join_all(
        repos
            .iter()
            .map(|repo| repo_report(repo, &policy, short)),
    )
    .await;

    let mut failures = 0;
    for (repo, report) in repos.iter().zip(reports) {
        match report {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{} {}: {}", style::cross(), repo.name(), e);
                failures += 1;
            }
        }
    }
    Ok(failures)
}

async fn repo_report(repo: &Repository, policy: &RemotePolicy, short: bool) -> Result<String> {
    let branch = repo.current_branch().await?;

    let mut line = format!("[{}] ", style::repo_name(repo.name(), repo.color()));
    let counts = if repo.has_remote() {
        repo.ahead_behind(policy.remote_for(&branch), &branch).await.ok()
    } else {
        None
    };
    match counts {
        Some((ahead, behind)) => {
            line.push_str(&branch);
            if ahead > 0 {
                line.push_str(&format!(" {}", format!("↑{}", ahead).green()));
            }
            if behind > 0 {
                line.push_str(&format!(" {}", format!("↓{}", behind).red()));
            }
        }
        // No upstream to compare against.
        None => line.push_str(&branch.dimmed().to_string()),
    }

    if !short {
        for entry in repo.status().await? {
            if entry.len() > 3 {
                line.push_str(&format!(
                    "\n   |{} {}",
                    style::colorize_status_code(&entry[..2]),
                    &entry[3..]
                ));
            }
        }
    }
    Ok(line)
}
