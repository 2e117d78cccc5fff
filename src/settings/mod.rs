//! Loading and validation of settings.
//!
//! Values defined in the configuration file can be overridden by environment variables. An example
//! configuration file can be found in the `configs/` directory located in the repository root.

use std::{fmt, path::Path};

use config::{Config, ConfigError, Environment};
use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize,
};
use thiserror::Error;
use tracing_subscriber::filter::EnvFilter;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::mask::MaskConfig;

#[cfg(test)]
mod tests;

#[derive(Error, Debug)]
/// An error related to loading and validation of settings.
pub enum SettingsError {
    #[error("configuration loading failed: {0}")]
    Loading(#[from] ConfigError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

#[derive(Debug, Validate, Deserialize)]
/// The combined settings.
///
/// Each section in the configuration file corresponds to the identically named settings field.
pub struct Settings {
    #[validate]
    pub mask: MaskSettings,
    #[serde(default)]
    pub input: InputSettings,
    pub log: LoggingSettings,
}

impl Settings {
    /// Loads and validates the settings via a configuration file.
    ///
    /// # Errors
    /// Fails when the loading of the configuration file or its validation failed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let settings: Settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        config.merge(config::File::from(path.as_ref()))?;
        config.merge(Environment::with_prefix("fairshare").separator("__"))?;
        config.try_into()
    }
}

#[derive(Debug, Validate, Deserialize, Clone, Copy, PartialEq)]
#[validate(schema(function = "validate_mask"))]
/// Masking settings.
pub struct MaskSettings {
    /// The inclusive lower bound of the range mask elements are drawn from.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// low = 0.0
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// FAIRSHARE_MASK__LOW=0.0
    /// ```
    pub low: f64,

    /// The exclusive upper bound of the range mask elements are drawn from. It must be greater
    /// than the lower bound.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [mask]
    /// high = 1.0
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// FAIRSHARE_MASK__HIGH=1.0
    /// ```
    pub high: f64,
}

impl MaskSettings {
    fn validate_mask(&self) -> Result<(), ValidationError> {
        MaskConfig::from(*self)
            .validate()
            .map_err(|_| ValidationError::new("invalid mask range"))
    }
}

/// A wrapper for validate derive.
fn validate_mask(s: &MaskSettings) -> Result<(), ValidationError> {
    s.validate_mask()
}

impl Default for MaskSettings {
    fn default() -> Self {
        let MaskConfig { low, high } = MaskConfig::default();
        Self { low, high }
    }
}

impl From<MaskSettings> for MaskConfig {
    fn from(settings: MaskSettings) -> Self {
        MaskConfig {
            low: settings.low,
            high: settings.high,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
/// Settings for reading attribute files.
pub struct InputSettings {
    /// The character separating the cells of a row.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [input]
    /// delimiter = ","
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// FAIRSHARE_INPUT__DELIMITER=,
    /// ```
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Whether every row must have exactly one membership.
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [input]
    /// require_one_hot = true
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// FAIRSHARE_INPUT__REQUIRE_ONE_HOT=true
    /// ```
    #[serde(default)]
    pub require_one_hot: bool,
}

fn default_delimiter() -> char {
    ','
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            require_one_hot: false,
        }
    }
}

#[derive(Debug, Deserialize)]
/// Logging settings.
pub struct LoggingSettings {
    /// A comma-separated list of logging directives. More information about logging directives
    /// can be found [here].
    ///
    /// # Examples
    ///
    /// **TOML**
    /// ```text
    /// [log]
    /// filter = "info"
    /// ```
    ///
    /// **Environment variable**
    /// ```text
    /// FAIRSHARE_LOG__FILTER=info
    /// ```
    ///
    /// [here]: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives
    #[serde(deserialize_with = "deserialize_env_filter")]
    pub filter: EnvFilter,
}

fn deserialize_env_filter<'de, D>(deserializer: D) -> Result<EnvFilter, D::Error>
where
    D: Deserializer<'de>,
{
    struct EnvFilterVisitor;

    impl<'de> Visitor<'de> for EnvFilterVisitor {
        type Value = EnvFilter;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a valid tracing filter directive: https://docs.rs/tracing-subscriber/0.2.15/tracing_subscriber/filter/struct.EnvFilter.html#directives")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            EnvFilter::try_new(value)
                .map_err(|_| de::Error::invalid_value(serde::de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_str(EnvFilterVisitor)
}
