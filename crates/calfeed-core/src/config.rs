use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_BUFFER_HOURS, DEFAULT_DAYS_AHEAD, DEFAULT_DAYS_BEFORE, DEFAULT_FETCH_TIMEOUT_SECS,
    MAX_BUFFER_HOURS,
};
use crate::error::{CoreError, CoreResult};
use crate::types::{CalendarSource, FloatingTime};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub feeds: Vec<CalendarSource>,
    pub window: WindowConfig,
    pub fetch: FetchConfig,
    pub parse: ParseConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub days_before: u32,
    pub days_ahead: u32,
    pub buffer_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub floating_time: FloatingTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with every default.
    ///
    /// ## Errors
    /// Returns an error if a default value cannot be registered.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("window.days_before", i64::from(DEFAULT_DAYS_BEFORE))?
            .set_default("window.days_ahead", i64::from(DEFAULT_DAYS_AHEAD))?
            .set_default("window.buffer_hours", i64::from(DEFAULT_BUFFER_HOURS))?
            .set_default("fetch.timeout_secs", i64::from(DEFAULT_FETCH_TIMEOUT_SECS))?
            .set_default("parse.floating_time", "local")?
            .set_default("output.format", "text")?
            .set_default("logging.level", "info")?)
    }

    /// ## Summary
    /// Loads configuration from `config.toml` and environment variables into a `Settings`.
    /// Environment variables (`CALFEED_WINDOW__DAYS_AHEAD=14`) take precedence
    /// over file values.
    ///
    /// ## Errors
    /// Returns an error if building, deserializing or validating the
    /// configuration fails.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("CALFEED")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(config::Case::Snake)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        tracing::debug!(
            feeds = settings.feeds.len(),
            active = settings.active_feeds().len(),
            "Settings loaded"
        );

        Ok(settings)
    }

    /// ## Summary
    /// Checks invariants serde cannot express.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` for a zero fetch timeout, a
    /// `window.buffer_hours` above `MAX_BUFFER_HOURS`, or two feeds sharing
    /// an id.
    pub fn validate(&self) -> CoreResult<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(CoreError::ConfigError(
                "fetch.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.window.buffer_hours > MAX_BUFFER_HOURS {
            return Err(CoreError::ConfigError(format!(
                "window.buffer_hours must be at most {MAX_BUFFER_HOURS}, got {}",
                self.window.buffer_hours
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for feed in &self.feeds {
            if !seen.insert(feed.id.as_str()) {
                return Err(CoreError::ConfigError(format!(
                    "duplicate feed id '{}'",
                    feed.id
                )));
            }
        }

        Ok(())
    }

    /// ## Summary
    /// Returns the configured feeds that are enabled and have a URL.
    #[must_use]
    pub fn active_feeds(&self) -> Vec<&CalendarSource> {
        self.feeds.iter().filter(|feed| feed.is_active()).collect()
    }
}

/// ## Summary
/// Loads configuration from environment variables, `.env` and `config.toml`.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
