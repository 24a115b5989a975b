//! Layered runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `CO2WATCH_*` environment variables, then command-line overrides.
//!
//! ```toml
//! gateway_url = "http://10.217.55.246/json"
//! poll_interval_secs = 5
//! history_records = 20
//! label_style = "capture-time"
//! sensor_epoch = "y2k"
//! ```

use std::path::Path;
use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat, Map};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::data::history::{LabelStyle, RecordCount, SeriesOptions, ALLOWED_RECORD_COUNTS};
use crate::poller::PollerConfig;
use crate::source::SensorEpoch;

/// Environment variable prefix, e.g. `CO2WATCH_GATEWAY_URL`.
pub const ENV_PREFIX: &str = "CO2WATCH";

/// Gateway the sensor firmware serves by default.
pub const DEFAULT_GATEWAY_URL: &str = "http://10.217.55.246/json";

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("history_records must be one of {allowed:?}, got {got}")]
    UnsupportedRecordCount { got: usize, allowed: &'static [usize] },

    #[error("invalid gateway URL {url:?}: {reason}")]
    InvalidGateway { url: String, reason: String },

    #[error("y_padding must be a finite, non-negative number, got {0}")]
    InvalidPadding(f64),
}

/// Validated application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gateway_url: String,
    pub poll_interval_secs: u64,
    pub clock_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub history_records: usize,
    pub y_padding: f64,
    pub label_style: LabelStyle,
    pub sensor_epoch: SensorEpoch,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            poll_interval_secs: 5,
            clock_interval_secs: 5,
            request_timeout_secs: 4,
            history_records: RecordCount::default().get(),
            y_padding: co2watch_types::DEFAULT_Y_PADDING,
            label_style: LabelStyle::default(),
            sensor_epoch: SensorEpoch::default(),
        }
    }
}

/// Values given on the command line. `None` leaves the layered value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gateway_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub history_records: Option<usize>,
}

impl Settings {
    /// Load settings from all layers and validate them.
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, overrides, None)
    }

    fn load_with_env(
        config_path: Option<&Path>,
        overrides: &Overrides,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            debug!("Reading settings from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.apply(overrides);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(ref url) = overrides.gateway_url {
            self.gateway_url = url.clone();
        }
        if let Some(secs) = overrides.poll_interval_secs {
            self.poll_interval_secs = secs;
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(n) = overrides.history_records {
            self.history_records = n;
        }
    }

    /// Check every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("poll_interval_secs"));
        }
        if self.clock_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("clock_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("request_timeout_secs"));
        }
        if RecordCount::new(self.history_records).is_none() {
            return Err(ConfigError::UnsupportedRecordCount {
                got: self.history_records,
                allowed: &ALLOWED_RECORD_COUNTS,
            });
        }
        if !self.y_padding.is_finite() || self.y_padding < 0.0 {
            return Err(ConfigError::InvalidPadding(self.y_padding));
        }
        self.gateway()?;
        Ok(())
    }

    /// The parsed gateway URL.
    pub fn gateway(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.gateway_url).map_err(|e| ConfigError::InvalidGateway {
            url: self.gateway_url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidGateway {
                url: self.gateway_url.clone(),
                reason: format!("unsupported scheme {:?}", other),
            }),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            fetch_interval: Duration::from_secs(self.poll_interval_secs),
            clock_interval: Duration::from_secs(self.clock_interval_secs),
        }
    }

    pub fn record_count(&self) -> RecordCount {
        RecordCount::new(self.history_records).unwrap_or_default()
    }

    /// Series options for the history view, labelling capture times in
    /// `offset`.
    pub fn series_options(&self, offset: time::UtcOffset) -> SeriesOptions {
        SeriesOptions {
            padding: self.y_padding,
            labels: self.label_style,
            offset,
        }
    }
}
