use std::path::PathBuf;
use std::time::Duration;

use airwatch_core::error::CoreError;
use airwatch_core::thresholds::ThresholdSet;
use airwatch_core::window::DEFAULT_RETENTION;

use crate::scheduler::DEFAULT_POLL_INTERVAL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} is invalid ({value:?}): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read threshold file {path}: {source}")]
    ThresholdFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid threshold configuration: {0}")]
    Thresholds(#[from] CoreError),
}

/// Agent configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Snapshot endpoint.
    pub source_url: String,
    /// Time between polls; also bounds each fetch.
    pub poll_interval: Duration,
    /// Maximum sample age kept in each window.
    pub retention: Duration,
    /// Optional JSON threshold table override.
    pub thresholds_path: Option<PathBuf>,
}

impl AgentConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default            |
    /// |------------------------|--------------------|
    /// | `SOURCE_URL`           | required           |
    /// | `POLL_INTERVAL_MS`     | `30000`            |
    /// | `RETENTION_HORIZON_MS` | `86400000`         |
    /// | `THRESHOLDS_PATH`      | built-in tables    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let source_url = lookup("SOURCE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("SOURCE_URL"))?;
        reqwest::Url::parse(&source_url).map_err(|e| ConfigError::Invalid {
            name: "SOURCE_URL",
            value: source_url.clone(),
            reason: e.to_string(),
        })?;

        let poll_interval =
            millis_or_default(&lookup, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?;
        let retention = millis_or_default(&lookup, "RETENTION_HORIZON_MS", DEFAULT_RETENTION)?;

        let thresholds_path = lookup("THRESHOLDS_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            source_url,
            poll_interval,
            retention,
            thresholds_path,
        })
    }

    /// Upper bound on a single fetch. A fetch that outlives one poll
    /// interval is reported as a network failure.
    pub fn fetch_timeout(&self) -> Duration {
        self.poll_interval
    }

    /// Build the threshold set: built-in tables, overridden by the
    /// configured file if any.
    pub fn load_thresholds(&self) -> Result<ThresholdSet, ConfigError> {
        let thresholds = ThresholdSet::builtin();
        let Some(path) = &self.thresholds_path else {
            return Ok(thresholds);
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ThresholdFile {
            path: path.clone(),
            source,
        })?;
        Ok(thresholds.with_overrides_json(&json)?)
    }
}

fn millis_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        Ok(_) => Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: "must be greater than zero".into(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
