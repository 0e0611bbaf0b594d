use crate::error::{AcademyError, Result};
use crate::paths;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProgramConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub name: String,
    /// Calendar date of program day 1.
    pub start_date: NaiveDate,
    #[serde(default = "default_length_days")]
    pub length_days: u32,
}

fn default_length_days() -> u32 {
    25
}

// ---------------------------------------------------------------------------
// ContentConfig
// ---------------------------------------------------------------------------

/// GitHub-style repository holding briefing markdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteContentConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_remote_prefix")]
    pub path_prefix: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Name of the env var holding an optional API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_remote_prefix() -> String {
    "briefings".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Local briefing directory, relative to the project root.
    #[serde(default = "default_content_dir")]
    pub local_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteContentConfig>,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from(paths::CONTENT_DIR)
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            local_dir: default_content_dir(),
            remote: None,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

// ---------------------------------------------------------------------------
// CronConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronConfig {
    /// Env var holding the shared bearer secret for scheduled endpoints.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

fn default_secret_env() -> String {
    "ACADEMY_CRON_SECRET".to_string()
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
        }
    }
}

impl CronConfig {
    /// The configured secret, if the env var is set and non-empty.
    pub fn secret(&self) -> Option<String> {
        std::env::var(&self.secret_env)
            .ok()
            .filter(|s| !s.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub program: ProgramConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub cron: CronConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            version: 1,
            program: ProgramConfig {
                name: name.into(),
                start_date,
                length_days: default_length_days(),
            },
            content: ContentConfig::default(),
            cron: CronConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(AcademyError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Program day for `today`; day 1 is the start date.
    pub fn program_day(&self, today: NaiveDate) -> i64 {
        crate::readiness::program_day(self.program.start_date, today)
    }

    /// Reject days outside `1..=length_days`.
    pub fn validate_day(&self, day: u32) -> Result<()> {
        if day == 0 || day > self.program.length_days {
            return Err(AcademyError::InvalidDay {
                day,
                max: self.program.length_days,
            });
        }
        Ok(())
    }

    pub fn content_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.content.local_dir)
    }
}
