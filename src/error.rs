//! Error types for gitfleet
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in gitfleet
#[derive(Debug, Error)]
pub enum FleetError {
    /// No viable target branch resolves for a repository (fatal, pre-execution)
    #[error("no branch matching '{target}' found in repository {repo}")]
    Planning { repo: String, target: String },

    /// The orchestration/rendering runtime itself failed to start
    #[error("launch error: {0}")]
    Launch(String),

    /// A git command failed; carries the command's combined output
    #[error("{0}")]
    Git(String),

    /// A rebase stopped on conflicts; entries are porcelain status lines
    #[error("conflicts rebasing on '{branch}'")]
    RebaseConflicts { branch: String, conflicts: Vec<String> },

    /// No tracking relationship exists for the branch
    #[error("no upstream for branch '{branch}'")]
    NoUpstream { branch: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gitfleet operations
pub type Result<T> = std::result::Result<T, FleetError>;
