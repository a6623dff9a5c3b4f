//! Layered application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory name under the user's config dir.
pub const CONFIG_DIR: &str = "courtside";
/// Prefix for environment overrides, e.g. `COURTSIDE_FETCH__PROGRAM`.
pub const ENV_PREFIX: &str = "COURTSIDE";

const DEFAULT_CONFIG: &str = r#"# Courtside configuration.
# Every key is optional; environment variables such as
# COURTSIDE_FETCH__PROGRAM or COURTSIDE_POLL__ACTIVE_SECS override this file.

[fetch]
# Score scraper, invoked as: <program> <args...> <YYYY-MM-DD>...
program = "python3"
args = ["fetch_scores.py"]
# Seconds before a hung scraper is killed; 0 waits forever.
timeout_secs = 30
# Largest accepted scraper output.
max_output_bytes = 8388608
# Serve scores from a local JSON file instead of running the scraper.
# fixture = "/path/to/scores.json"

[poll]
# Refresh of the visible tab plus today.
active_secs = 60
# Refresh of yesterday, today and tomorrow.
full_secs = 600
"#;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How scores are fetched.
    pub fetch: FetchConfig,
    /// Refresh cadence.
    pub poll: PollConfig,
}

/// External scraper settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Executable to spawn.
    pub program: String,
    /// Arguments placed before the requested dates.
    pub args: Vec<String>,
    /// Kill the scraper after this many seconds; `0` disables the limit.
    pub timeout_secs: u64,
    /// Upper bound on scraper stdout.
    pub max_output_bytes: usize,
    /// Optional JSON file served instead of the scraper.
    pub fixture: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["fetch_scores.py".to_string()],
            timeout_secs: 30,
            max_output_bytes: 8 * 1024 * 1024,
            fixture: None,
        }
    }
}

impl FetchConfig {
    /// Timeout as a duration, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Polling intervals.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between active-tab refreshes.
    pub active_secs: u64,
    /// Seconds between full three-day refreshes.
    pub full_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            active_secs: 60,
            full_secs: 600,
        }
    }
}

impl PollConfig {
    /// Active refresh period, never shorter than one second.
    pub fn active_interval(&self) -> Duration {
        Duration::from_secs(self.active_secs.max(1))
    }

    /// Full refresh period, never shorter than one second.
    pub fn full_interval(&self) -> Duration {
        Duration::from_secs(self.full_secs.max(1))
    }
}

impl AppConfig {
    /// Default location of the config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join("config.toml")
    }

    /// Load from the default file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from `path` (which may be missing) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::default_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let temp = tempdir()?;
        let config = AppConfig::load_from(temp.path().join("absent.toml"))?;
        assert_eq!(config.poll.active_interval(), Duration::from_secs(60));
        assert_eq!(config.poll.full_interval(), Duration::from_secs(600));
        assert_eq!(config.fetch.timeout(), Some(Duration::from_secs(30)));
        assert!(config.fetch.fixture.is_none());
        Ok(())
    }

    #[test]
    fn written_default_round_trips() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("nested/config.toml");
        write_default_config(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.fetch.program, "python3");
        assert_eq!(config.fetch.args, vec!["fetch_scores.py".to_string()]);
        assert_eq!(config.fetch.max_output_bytes, 8 * 1024 * 1024);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[fetch]
program = "/usr/local/bin/scores"
args = []
timeout_secs = 0
fixture = "scores.json"

[poll]
active_secs = 15
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.fetch.program, "/usr/local/bin/scores");
        assert!(config.fetch.args.is_empty());
        assert_eq!(config.fetch.timeout(), None);
        assert_eq!(config.fetch.fixture, Some(PathBuf::from("scores.json")));
        assert_eq!(config.poll.active_secs, 15);
        assert_eq!(config.poll.full_secs, 600);
        Ok(())
    }

    #[test]
    fn existing_file_is_not_overwritten() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("config.toml");
        fs::write(&path, "[poll]\nfull_secs = 120\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "[poll]\nfull_secs = 120\n");
        Ok(())
    }
}
