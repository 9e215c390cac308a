//! Registry of the fleet's repositories.
//!
//! Built once from configuration and passed explicitly into every component
//! so tests can substitute their own set. Display order is ascending name
//! order, fixed at construction.

use crate::config::Config;
use crate::error::{FleetError, Result};
use crate::repo::Repository;
use colored::Color;
use std::sync::Arc;

/// The fixed set of repositories for one run.
#[derive(Debug, Clone)]
pub struct Registry {
    repos: Vec<Arc<Repository>>,
}

impl Registry {
    /// Build from configuration, resolving paths against the fleet root.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.repos.is_empty() {
            return Err(FleetError::Config("no repositories configured".to_string()));
        }

        let root = config.root();
        let mut repos = Vec::with_capacity(config.repos.len());
        for rc in &config.repos {
            let path = root.join(&rc.path);
            repos.push(Arc::new(Repository::new(
                &rc.name,
                path,
                parse_color(&rc.color),
                rc.has_remote,
            )));
        }
        Ok(Self::new(repos))
    }

    /// Build from an explicit repository set; sorts by name.
    pub fn new(mut repos: Vec<Arc<Repository>>) -> Self {
        repos.sort_by(|a, b| a.name().cmp(b.name()));
        Self { repos }
    }

    /// Repositories in display order.
    pub fn repos(&self) -> &[Arc<Repository>] {
        &self.repos
    }

    /// Repositories in display order, optionally excluding those without a
    /// remote (the default subset; `--all` includes everything).
    pub fn subset(&self, all: bool) -> Vec<Arc<Repository>> {
        self.repos
            .iter()
            .filter(|r| all || r.has_remote())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

fn parse_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, has_remote: bool) -> Arc<Repository> {
        Arc::new(Repository::new(name, format!("/tmp/{}", name), Color::White, has_remote))
    }

    #[test]
    fn test_registry_sorted_by_name() {
        let registry = Registry::new(vec![repo("upgrade", true), repo("community", true)]);
        let names: Vec<_> = registry.repos().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["community", "upgrade"]);
    }

    #[test]
    fn test_subset_excludes_no_remote_by_default() {
        let registry = Registry::new(vec![repo(".workspace", false), repo("community", true)]);

        let default_subset = registry.subset(false);
        assert_eq!(default_subset.len(), 1);
        assert_eq!(default_subset[0].name(), "community");

        let broad = registry.subset(true);
        assert_eq!(broad.len(), 2);
    }

    #[test]
    fn test_from_config_default() {
        let config = Config::default();
        let registry = Registry::from_config(&config).unwrap();
        assert_eq!(registry.len(), 4);
        // Sorted: ".workspace" sorts first.
        assert_eq!(registry.repos()[0].name(), ".workspace");
        assert!(!registry.repos()[0].has_remote());
    }

    #[test]
    fn test_from_config_empty_fails() {
        let mut config = Config::default();
        config.repos.clear();
        assert!(matches!(Registry::from_config(&config), Err(FleetError::Config(_))));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("yellow"), Color::Yellow);
        assert_eq!(parse_color("Blue"), Color::Blue);
        assert_eq!(parse_color("unknown"), Color::White);
    }
}
