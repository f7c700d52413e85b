use crate::interval::{ParseIntervalError, RestartInterval};
use std::collections::HashMap;
use thiserror::Error;

pub(crate) const RESTART_CONTAINER: &str = "RESTART_CONTAINER";
pub(crate) const RESTART_INTERVAL: &str = "RESTART_INTERVAL";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("RESTART_CONTAINER has unrecognised value `{0}`")]
    InvalidFlag(String),
    #[error("RESTART_CONTAINER is set but RESTART_INTERVAL is missing")]
    MissingInterval,
    #[error("invalid RESTART_INTERVAL: {0}")]
    Interval(#[from] ParseIntervalError),
}

/// Restart settings a container declares through its environment.
///
/// Read fresh every cycle; nothing here is cached between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RestartConfig {
    Disabled,
    Enabled(RestartInterval),
}

impl RestartConfig {
    pub(crate) fn from_env(env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let enabled = match env.get(RESTART_CONTAINER) {
            Some(flag) => parse_flag(flag)?,
            None => false,
        };
        if !enabled {
            return Ok(RestartConfig::Disabled);
        }

        let raw = env
            .get(RESTART_INTERVAL)
            .ok_or(ConfigError::MissingInterval)?;
        Ok(RestartConfig::Enabled(raw.parse()?))
    }
}

fn parse_flag(raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag(raw.to_string())),
    }
}

/// Splits declared `KEY=VALUE` entries. The value is everything after the first `=`;
/// entries without one are ignored.
pub(crate) fn env_map<I, S>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter_map(|entry| {
            entry
                .as_ref()
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
        })
        .collect()
}
