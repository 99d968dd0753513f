use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::RepoSlug;

const DEFAULT_CONFIG_FILE: &str = ".pr-hotspots.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read bug list {}: {source}", .path.display())]
    BugsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Top-level configuration loaded from .pr-hotspots.toml.
///
/// Every field is optional in the file. Credentials and repository
/// coordinates fall back to the environment, the rest to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub bugs: BugsConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// API token. Falls back to GITHUB_PERSONAL_ACCESS_TOKEN, then GITHUB_TOKEN.
    pub token: Option<String>,
    /// Falls back to GITHUB_OWNER
    pub owner: Option<String>,
    /// Falls back to GITHUB_REPO
    pub repo: Option<String>,
    /// API root for GitHub Enterprise installs
    pub api_url: Option<String>,
}

/// Where the tracked bug identifiers come from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BugsConfig {
    /// Project prefix of bug tokens, e.g. "NVIEW"
    pub prefix: Option<String>,
    #[serde(default)]
    pub ids: Vec<String>,
    /// Text file with one id per line; merged with `ids`
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub retention_months: u32,
    pub per_page: u32,
    pub start_page: u32,
    pub output: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            retention_months: 6,
            per_page: 100,
            start_page: 1,
            output: PathBuf::from("output.json"),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from .pr-hotspots.toml in the
    /// current directory when no path is given. A missing default file
    /// yields the default config; an explicit path must exist.
    ///
    /// Unset GitHub settings are then filled from the environment.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.fill_from_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill unset GitHub settings through `lookup`.
    fn fill_from_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let github = &mut self.github;
        if github.token.is_none() {
            github.token =
                lookup("GITHUB_PERSONAL_ACCESS_TOKEN").or_else(|| lookup("GITHUB_TOKEN"));
        }
        if github.owner.is_none() {
            github.owner = lookup("GITHUB_OWNER");
        }
        if github.repo.is_none() {
            github.repo = lookup("GITHUB_REPO");
        }
    }

    pub fn github_token(&self) -> Result<String, ConfigError> {
        self.github
            .token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::Missing("github.token (or GITHUB_PERSONAL_ACCESS_TOKEN)"))
    }

    pub fn repository(&self) -> Result<RepoSlug, ConfigError> {
        let owner = self
            .github
            .owner
            .clone()
            .ok_or(ConfigError::Missing("github.owner (or GITHUB_OWNER)"))?;
        let repo = self
            .github
            .repo
            .clone()
            .ok_or(ConfigError::Missing("github.repo (or GITHUB_REPO)"))?;
        Ok(RepoSlug { owner, repo })
    }

    /// The allow-list: inline `ids` followed by the lines of `file`.
    ///
    /// Blank lines and `#` comments in the file are skipped.
    pub fn bug_ids(&self) -> Result<Vec<String>, ConfigError> {
        let mut ids: Vec<String> = self
            .bugs
            .ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        if let Some(path) = &self.bugs.file {
            let contents = fs::read_to_string(path).map_err(|source| ConfigError::BugsFile {
                path: path.clone(),
                source,
            })?;
            ids.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }

        Ok(ids)
    }

    /// Reject paging values the GitHub API would not honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.scan.per_page) {
            return Err(ConfigError::Invalid(format!(
                "scan.per_page must be between 1 and 100, got {}",
                self.scan.per_page
            )));
        }
        if self.scan.start_page == 0 {
            return Err(ConfigError::Invalid(
                "scan.start_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
