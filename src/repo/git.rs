//! Repository wraps one git working copy.
//!
//! Every operation shells out to `git -C <path>`. The command stream of a
//! single repository is serialized through a read/write lock: inspections
//! (branch listing, status, ahead/behind) take the shared lock and may
//! overlap, mutations (switch, fetch, pull, commit) take the exclusive lock.
//! No lock is ever held across repositories.

use crate::error::{FleetError, Result};
use colored::Color;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::{OnceCell, RwLock};

/// One git working copy in the fleet.
#[derive(Debug)]
pub struct Repository {
    name: String,
    path: PathBuf,
    color: Color,
    has_remote: bool,
    /// Serializes this repository's git command stream.
    lock: RwLock<()>,
    /// Local branch names, listed once per run.
    branches: OnceCell<Vec<String>>,
}

impl Repository {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, color: Color, has_remote: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            color,
            has_remote,
            lock: RwLock::new(()),
            branches: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Whether this working copy has a remote to fetch from or push to.
    pub fn has_remote(&self) -> bool {
        self.has_remote
    }

    async fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .await
            .map_err(|e| FleetError::Git(format!("failed to execute git: {}", e)))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(FleetError::Git(format!(
                "git {}: {}",
                args.join(" "),
                text.trim()
            )));
        }
        Ok(text)
    }

    /// Run a read-only git command under the shared lock.
    async fn read_command(&self, args: &[&str]) -> Result<String> {
        let _guard = self.lock.read().await;
        self.run_git(args).await
    }

    /// Run a mutating git command under the exclusive lock.
    async fn write_command(&self, args: &[&str]) -> Result<()> {
        let _guard = self.lock.write().await;
        self.run_git(args).await.map(|_| ())
    }

    /// All local branch names. Listed once and cached for the run.
    pub async fn branches(&self) -> Result<&[String]> {
        let branches = self
            .branches
            .get_or_try_init(|| async {
                let output = self.read_command(&["branch"]).await?;
                let mut names = Vec::new();
                for line in output.lines() {
                    let line = line.trim().trim_start_matches("* ");
                    if !line.is_empty() {
                        names.push(line.to_string());
                    }
                }
                Ok::<_, FleetError>(names)
            })
            .await?;
        Ok(branches)
    }

    pub async fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.branches().await?.iter().any(|b| b == branch))
    }

    /// The checked-out branch name.
    pub async fn current_branch(&self) -> Result<String> {
        let output = self.read_command(&["branch", "--show-current"]).await?;
        Ok(output.trim().to_string())
    }

    /// Pending-change entries in porcelain form: two-symbol code plus path.
    pub async fn status(&self) -> Result<Vec<String>> {
        let output = self.read_command(&["status", "--porcelain"]).await?;
        Ok(output
            .lines()
            .map(|l| l.trim_end().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// Counts of local-only and remote-only commits relative to
    /// `remote/branch`. Fails when no tracking relationship exists.
    pub async fn ahead_behind(&self, remote: &str, branch: &str) -> Result<(u32, u32)> {
        let range = format!("{}...{}/{}", branch, remote, branch);
        let output = self
            .read_command(&["rev-list", "--left-right", "--count", &range])
            .await
            .map_err(|_| FleetError::NoUpstream {
                branch: branch.to_string(),
            })?;

        let mut fields = output.split_whitespace();
        let ahead = fields.next().and_then(|f| f.parse().ok());
        let behind = fields.next().and_then(|f| f.parse().ok());
        match (ahead, behind) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(FleetError::Git(format!(
                "unexpected rev-list output: {:?}",
                output.trim()
            ))),
        }
    }

    /// Update the local ref for `branch` from `remote` without touching the
    /// checkout.
    pub async fn fetch_into_local(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("{}:{}", branch, branch);
        self.write_command(&["fetch", remote, &refspec]).await
    }

    /// Integrate upstream changes into the checked-out `branch`.
    pub async fn integrate_onto_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        self.write_command(&["pull", "--rebase", remote, branch]).await
    }

    /// Change the checkout to `branch`; fails if absent.
    pub async fn switch_to(&self, branch: &str) -> Result<()> {
        self.write_command(&["switch", branch]).await
    }

    /// Stage and commit all pending changes.
    pub async fn commit_all_pending(&self, message: &str) -> Result<()> {
        self.write_command(&["add", "."]).await?;
        self.write_command(&["commit", "-m", message]).await
    }
}
