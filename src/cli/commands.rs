//! CLI command definitions using clap.
//!
//! One subcommand per bulk operation: switch, pull, rebase, update, status,
//! list. Every command takes `--all` to include repositories outside the
//! default subset (those without a remote).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitfleet - bulk git operations across a fleet of release-tracking repositories
#[derive(Parser, Debug)]
#[command(name = "gitfleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Switch every repository to a branch, its version, or the fallback
    Switch {
        /// Requested branch name
        branch: String,

        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },

    /// Pull (rebase) the current branch in every repository
    Pull {
        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },

    /// Rebase the current branch onto its version branch
    Rebase {
        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },

    /// Bring every version branch up to date, newest first
    Update {
        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },

    /// Show current branch, ahead/behind counts and pending changes
    #[command(alias = "st")]
    Status {
        /// Do not show pending changes (shorter version)
        #[arg(short, long)]
        short: bool,

        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },

    /// List branches with a per-repository presence matrix
    #[command(alias = "ls")]
    List {
        /// Include repositories without a remote
        #[arg(short, long)]
        all: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_switch_command() {
        let cli = Cli::try_parse_from(["gitfleet", "switch", "17.0-feature"]).unwrap();
        match cli.command {
            Commands::Switch { branch, all } => {
                assert_eq!(branch, "17.0-feature");
                assert!(!all);
            }
            _ => panic!("Expected switch command"),
        }
    }

    #[test]
    fn test_switch_requires_branch() {
        assert!(Cli::try_parse_from(["gitfleet", "switch"]).is_err());
    }

    #[test]
    fn test_pull_with_all_flag() {
        let cli = Cli::try_parse_from(["gitfleet", "pull", "--all"]).unwrap();
        match cli.command {
            Commands::Pull { all } => assert!(all),
            _ => panic!("Expected pull command"),
        }
    }

    #[test]
    fn test_rebase_command() {
        let cli = Cli::try_parse_from(["gitfleet", "rebase"]).unwrap();
        assert!(matches!(cli.command, Commands::Rebase { all: false }));
    }

    #[test]
    fn test_update_command() {
        let cli = Cli::try_parse_from(["gitfleet", "update", "-a"]).unwrap();
        assert!(matches!(cli.command, Commands::Update { all: true }));
    }

    #[test]
    fn test_status_command_with_short() {
        let cli = Cli::try_parse_from(["gitfleet", "status", "-s"]).unwrap();
        match cli.command {
            Commands::Status { short, all } => {
                assert!(short);
                assert!(!all);
            }
            _ => panic!("Expected status command"),
        }
    }

    #[test]
    fn test_status_alias() {
        let cli = Cli::try_parse_from(["gitfleet", "st"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { .. }));
    }

    #[test]
    fn test_list_alias() {
        let cli = Cli::try_parse_from(["gitfleet", "ls"]).unwrap();
        assert!(matches!(cli.command, Commands::List { all: false }));
    }

    #[test]
    fn test_debug_flag_is_global() {
        let cli = Cli::try_parse_from(["gitfleet", "pull", "--debug"]).unwrap();
        assert!(cli.debug);
    }

    #[test]
    fn test_config_option() {
        let cli = Cli::try_parse_from(["gitfleet", "-c", "/path/to/gitfleet.yml", "list"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/gitfleet.yml")));
    }

    #[test]
    fn test_help_works() {
        Cli::command().debug_assert();
    }
}
