use crate::dispatcher::{
    DEFAULT_POLL_INTERVAL, DEFAULT_PROGRAM, DEFAULT_TIMEOUT, Dispatcher, TimeoutAction,
};
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dispatcher settings, read from `~/.config/smirc-dispatch/config.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "RawConfig")]
pub struct Config {
    pub program: PathBuf,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub on_timeout: TimeoutAction,
}

/// Intermediate type for deserialization (seconds/millis → `Duration`).
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_program")]
    program: PathBuf,
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default)]
    on_timeout: TimeoutAction,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            program: raw.program,
            timeout: Duration::from_secs(raw.timeout_seconds),
            poll_interval: Duration::from_millis(raw.poll_interval_ms),
            on_timeout: raw.on_timeout,
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from(DEFAULT_PROGRAM)
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[allow(clippy::cast_possible_truncation)]
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            on_timeout: TimeoutAction::default(),
        }
    }
}

impl Config {
    /// Loads the default config file, falling back to built-in defaults
    /// when it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            ConfigError::Invalid(format!(
                "Cannot read config at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            ConfigError::Invalid(format!("Invalid TOML in {}: {}", config_path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.program.as_os_str().is_empty() {
            anyhow::bail!("program must not be empty");
        }
        let secs = self.timeout.as_secs();
        if secs == 0 || secs > 3600 {
            anyhow::bail!("timeout_seconds must be between 1 and 3600");
        }
        if self.poll_interval.is_zero() || self.poll_interval > Duration::from_secs(60) {
            anyhow::bail!("poll_interval_ms must be between 1 and 60000");
        }
        if self.poll_interval > self.timeout {
            anyhow::bail!("poll_interval_ms must not exceed timeout_seconds");
        }
        Ok(())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.program.clone())
            .with_timeout(self.timeout)
            .with_poll_interval(self.poll_interval)
            .with_timeout_action(self.on_timeout)
    }
}

fn config_file_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(
        home.join(".config")
            .join("smirc-dispatch")
            .join("config.toml"),
    )
}
