//! Configuration loading for Sluice.
//!
//! The config file lives at `~/.sluice/config.toml` unless `SLUICE_CONFIG`
//! points elsewhere. A missing file means defaults. Raw structs here keep
//! every field optional; [`SluiceConfig::resolve`] turns them into a
//! validated [`RunSettings`] plus console options, applying environment
//! overrides on the way.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use sluice_types::{
    ConsumerKind, EnumParseError, FullPolicy, Item, ProducerKind, RunSettings, Timing,
};

pub const CONFIG_PATH_ENV: &str = "SLUICE_CONFIG";
pub const PRODUCER_ENV: &str = "SLUICE_PRODUCER";
pub const CONSUMER_ENV: &str = "SLUICE_CONSUMER";
pub const POLICY_ENV: &str = "SLUICE_POLICY";
pub const CAPACITY_ENV: &str = "SLUICE_CAPACITY";
pub const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Enum(#[from] EnumParseError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Invalid { .. } | ConfigError::Enum(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SluiceConfig {
    pub channel: Option<ChannelConfig>,
    pub producer: Option<ProducerConfig>,
    pub consumer: Option<ConsumerConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChannelConfig {
    /// Buffer size. Must be at least 1. Default: 1.
    pub capacity: Option<usize>,
    /// `wait` or `drop-write`. Default: `wait`.
    pub policy: Option<FullPolicy>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProducerConfig {
    /// Default: `try-write`.
    pub strategy: Option<ProducerKind>,
    /// Delay between items in milliseconds. Default: 100.
    pub delay_ms: Option<u64>,
    /// Close the channel after this item (`blocking-write` and
    /// `probe-then-write` only).
    pub close_after: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsumerConfig {
    /// Default: `blocking-read`.
    pub strategy: Option<ConsumerKind>,
    /// Delay between reads in milliseconds. Default: 500.
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsoleConfig {
    /// Color report lines by category. Default: true.
    pub color: Option<bool>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub run: RunSettings,
    pub color: bool,
}

impl SluiceConfig {
    /// Load the config file at [`config_path`], if there is one.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        config_path()
            .filter(|path| path.exists())
            .map(|path| Self::load_from(&path))
            .transpose()
    }

    /// Read and parse one config file. Failures are logged and returned
    /// with the offending path attached.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let owned = || path.to_path_buf();
        let loaded = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: owned(),
                source,
            })
            .and_then(|text| {
                toml::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: owned(),
                    source,
                })
            });

        if let Err(err) = &loaded {
            tracing::warn!(path = %path.display(), "{err}");
        }
        loaded
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// Environment values win over the file. Empty values are ignored.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let channel = self.channel.as_ref();
        let producer = self.producer.as_ref();
        let consumer = self.consumer.as_ref();

        let capacity = match lookup(CAPACITY_ENV) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
                field: "capacity",
                reason: format!("'{}' is not a number", raw.trim()),
            })?,
            None => channel.and_then(|c| c.capacity).unwrap_or(1),
        };
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| ConfigError::Invalid {
            field: "capacity",
            reason: "must be at least 1".to_string(),
        })?;

        let policy = match lookup(POLICY_ENV) {
            Some(raw) => FullPolicy::parse(&raw)?,
            None => channel.and_then(|c| c.policy).unwrap_or_default(),
        };
        let producer_kind = match lookup(PRODUCER_ENV) {
            Some(raw) => ProducerKind::parse(&raw)?,
            None => producer.and_then(|p| p.strategy).unwrap_or_default(),
        };
        let consumer_kind = match lookup(CONSUMER_ENV) {
            Some(raw) => ConsumerKind::parse(&raw)?,
            None => consumer.and_then(|c| c.strategy).unwrap_or_default(),
        };

        let defaults = Timing::default();
        let timing = Timing::new(
            producer
                .and_then(|p| p.delay_ms)
                .map_or(defaults.producer_delay(), Duration::from_millis),
            consumer
                .and_then(|c| c.delay_ms)
                .map_or(defaults.consumer_delay(), Duration::from_millis),
        );

        let close_after = producer.and_then(|p| p.close_after);
        if close_after.is_some() && !producer_kind.honours_close_after() {
            tracing::warn!(
                strategy = %producer_kind,
                "close_after is ignored for this producer strategy"
            );
        }

        let run = RunSettings::new(capacity, policy)
            .with_producer(producer_kind)
            .with_consumer(consumer_kind)
            .with_timing(timing)
            .with_close_after(close_after);

        let color = lookup(NO_COLOR_ENV).is_none()
            && self
                .console
                .as_ref()
                .and_then(|c| c.color)
                .unwrap_or(true);

        Ok(Settings { run, color })
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".sluice").join("config.toml"))
}
