use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the fleet root directory.
pub const ROOT_ENV: &str = "GITFLEET_ROOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Root directory containing the working copies; `GITFLEET_ROOT` wins.
    pub root: Option<PathBuf>,
    /// Last-resort target when neither a requested branch nor its derived
    /// version exists in a repository.
    pub fallback_branch: String,
    pub remotes: RemotesConfig,
    pub render: RenderConfig,
    pub repos: Vec<RepoConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemotesConfig {
    /// Remote holding the version branches.
    pub canonical: String,
    /// Remote holding development branches.
    pub development: String,
}

impl Default for RemotesConfig {
    fn default() -> Self {
        Self {
            canonical: "origin".to_string(),
            development: "dev".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Repaint interval for the live status display.
    pub tick_rate_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 100 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub name: String,
    /// Path relative to the fleet root.
    pub path: String,
    /// Display color (red, yellow, green, blue, magenta, cyan, white).
    #[serde(default = "default_color")]
    pub color: String,
    /// Repositories without a remote are excluded from remote operations.
    #[serde(default = "default_true")]
    pub has_remote: bool,
}

fn default_color() -> String {
    "white".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            root: None,
            fallback_branch: "master".to_string(),
            remotes: RemotesConfig::default(),
            render: RenderConfig::default(),
            repos: vec![
                RepoConfig {
                    name: ".workspace".to_string(),
                    path: ".vscode".to_string(),
                    color: "red".to_string(),
                    has_remote: false,
                },
                RepoConfig {
                    name: "community".to_string(),
                    path: "community".to_string(),
                    color: "yellow".to_string(),
                    has_remote: true,
                },
                RepoConfig {
                    name: "enterprise".to_string(),
                    path: "enterprise".to_string(),
                    color: "green".to_string(),
                    has_remote: true,
                },
                RepoConfig {
                    name: "upgrade".to_string(),
                    path: "upgrade".to_string(),
                    color: "blue".to_string(),
                    has_remote: true,
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Resolve the fleet root: environment variable, then config, then ".".
    pub fn root(&self) -> PathBuf {
        if let Ok(root) = std::env::var(ROOT_ENV)
            && !root.is_empty()
        {
            return PathBuf::from(root);
        }
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fallback_branch, "master");
        assert_eq!(config.remotes.canonical, "origin");
        assert_eq!(config.remotes.development, "dev");
        assert_eq!(config.repos.len(), 4);
        assert!(!config.repos[0].has_remote);
    }

    #[test]
    fn test_load_from_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "fallback_branch: main\nrepos:\n  - name: core\n    path: core\n    color: cyan"
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.fallback_branch, "main");
        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.repos[0].name, "core");
        assert!(config.repos[0].has_remote);
        assert_eq!(config.repos[0].color, "cyan");
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/gitfleet.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_render_defaults_survive_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "fallback_branch: main").unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.render.tick_rate_ms, 100);
        // Partial config falls back to the default repo set.
        assert_eq!(config.repos.len(), 4);
    }
}
