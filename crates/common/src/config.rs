//! Configuration for the activity log.
//!
//! Values are resolved in order of precedence:
//! 1. Command-line flag
//! 2. Environment variables (`ACTLOG_*`)
//! 3. Configuration file (`actlog.toml`, or the path in `ACTLOG_CONFIG`)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ENV_FILE: &str = "ACTLOG_FILE";
pub const ENV_CONFIG: &str = "ACTLOG_CONFIG";
pub const CONFIG_FILE_NAME: &str = "actlog.toml";

const DEFAULT_DIR: &str = ".actlog";
const DEFAULT_FILE: &str = "activity.json";

/// On-disk configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActlogConfig {
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Backing file. Relative paths are taken relative to the config file.
    pub file: Option<PathBuf>,
}

impl ActlogConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse actlog configuration")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    /// Finds the config file named by `ACTLOG_CONFIG`, else `actlog.toml`
    /// in `cwd`. A missing default file yields the default config.
    pub fn discover(cwd: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Ok(explicit) = env::var(ENV_CONFIG) {
            let path = PathBuf::from(explicit);
            let config = Self::load_file(&path)?;
            return Ok((config, Some(path)));
        }

        let candidate = cwd.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let config = Self::load_file(&candidate)?;
            debug!(path = %candidate.display(), "loaded config file");
            return Ok((config, Some(candidate)));
        }

        Ok((Self::default(), None))
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Flag,
    Env,
    File,
    Default,
}

/// Effective settings after precedence has been applied.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub file: PathBuf,
    pub file_source: ConfigSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
}

/// Resolves settings from the flag, the process environment and the
/// config file discovered from `cwd`.
pub fn resolve(flag_file: Option<PathBuf>, cwd: &Path) -> Result<ResolvedConfig> {
    let (config, config_path) = ActlogConfig::discover(cwd)?;
    let env_file = env::var(ENV_FILE).ok().filter(|v| !v.trim().is_empty());
    Ok(resolve_with(
        flag_file,
        env_file,
        &config,
        config_path,
        home_dir(),
    ))
}

/// Pure form of [`resolve`].
pub fn resolve_with(
    flag_file: Option<PathBuf>,
    env_file: Option<String>,
    config: &ActlogConfig,
    config_path: Option<PathBuf>,
    home: Option<PathBuf>,
) -> ResolvedConfig {
    let (file, file_source) = if let Some(p) = flag_file {
        (p, ConfigSource::Flag)
    } else if let Some(e) = env_file {
        (PathBuf::from(e), ConfigSource::Env)
    } else if let Some(f) = config.log.file.clone() {
        let anchored = match config_path.as_deref().and_then(Path::parent) {
            Some(dir) if f.is_relative() => dir.join(f),
            _ => f,
        };
        (anchored, ConfigSource::File)
    } else {
        (default_log_path(home), ConfigSource::Default)
    };

    ResolvedConfig {
        file,
        file_source,
        config_path,
    }
}

pub fn default_log_path(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_default().join(DEFAULT_DIR).join(DEFAULT_FILE)
}

fn home_dir() -> Option<PathBuf> {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from)
}
