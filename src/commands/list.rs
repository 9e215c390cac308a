//! List every local branch across the fleet with a presence matrix.
//!
//! One line per branch, newest version first, prefixed by a column of
//! colored repository initials marking where the branch exists.

use crate::error::Result;
use crate::repo::Registry;
use crate::style;
use crate::version::sort_branches;
use futures::future::try_join_all;
use std::collections::BTreeMap;

pub async fn run(registry: &Registry, all: bool) -> Result<usize> {
    let repos = registry.subset(all);
    let listings = try_join_all(repos.iter().map(|repo| repo.branches())).await?;

    let mut presence: BTreeMap<String, Vec<bool>> = BTreeMap::new();
    for (index, branches) in listings.iter().enumerate() {
        for branch in branches.iter() {
            presence
                .entry(branch.clone())
                .or_insert_with(|| vec![false; repos.len()])[index] = true;
        }
    }

    let mut names: Vec<String> = presence.keys().cloned().collect();
    sort_branches(&mut names);

    for name in names {
        let mut letters = String::new();
        for (index, repo) in repos.iter().enumerate() {
            if presence[&name][index] {
                letters.push_str(&style::repo_letter(repo.name(), repo.color()));
            } else {
                letters.push(' ');
            }
        }
        println!("{} - {}", letters, name);
    }
    Ok(0)
}
