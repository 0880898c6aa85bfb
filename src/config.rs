//! Configuration: TOML file, environment overrides, CLI overrides.
//!
//! File values are the base, `MAX_QUOTES_PER_RUN` / `OFFLINE_MODE` /
//! `DRY_RUN` from the environment override them, and CLI flags
//! override both. Core logic only ever sees the resolved [`RunOptions`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Published copy of the collection. `None` disables mirroring.
    #[serde(default = "default_mirror_file")]
    pub mirror_file: Option<PathBuf>,
    #[serde(default = "default_seeds_file")]
    pub seeds_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            mirror_file: default_mirror_file(),
            seeds_file: default_seeds_file(),
        }
    }
}

impl PathsConfig {
    /// Mirror destination; an empty `mirror_file` disables mirroring.
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data/quotes.json")
}
fn default_mirror_file() -> Option<PathBuf> {
    Some(PathBuf::from("site/data/quotes.json"))
}
fn default_seeds_file() -> PathBuf {
    PathBuf::from("data/seeds.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between attempts when a remote candidate was a duplicate.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.quotable.io".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_retry_delay_ms() -> u64 {
    200
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Quotes requested per run.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Attempts per slot before giving up on it.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_count() -> usize {
    1
}
fn default_max_retries() -> usize {
    10
}

/// Load and validate the config file.
///
/// When `required` is false a missing file yields the built-in defaults.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !required && !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.ingest.count == 0 {
        anyhow::bail!("ingest.count must be >= 1");
    }
    if config.ingest.max_retries == 0 {
        anyhow::bail!("ingest.max_retries must be >= 1");
    }
    if config.remote.base_url.trim().is_empty() {
        anyhow::bail!("remote.base_url must not be empty");
    }

    Ok(config)
}

/// Fully resolved options for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub count: usize,
    pub offline: bool,
    pub dry_run: bool,
}

/// Overrides given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub count: Option<usize>,
    pub offline: bool,
    pub dry_run: bool,
}

impl RunOptions {
    /// Resolve options from config, the process environment, and CLI flags.
    pub fn resolve(config: &Config, cli: CliOverrides) -> Self {
        Self::resolve_with(config, cli, |key| std::env::var(key).ok())
    }

    /// Same as [`resolve`](Self::resolve) with an explicit variable lookup.
    pub fn resolve_with(
        config: &Config,
        cli: CliOverrides,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_count = var("MAX_QUOTES_PER_RUN").map(|v| parse_count(&v));
        Self {
            count: cli.count.or(env_count).unwrap_or(config.ingest.count).max(1),
            offline: cli.offline || truthy(var("OFFLINE_MODE").as_deref()),
            dry_run: cli.dry_run || truthy(var("DRY_RUN").as_deref()),
        }
    }
}

/// `1`, `true`, `yes`, `on` (any case) are true; anything else is false.
pub fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Positive integer, falling back to 1 for anything else.
pub fn parse_count(value: &str) -> usize {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => 1,
    }
}
