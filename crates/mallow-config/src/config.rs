//! Main configuration types.
//!
//! This module provides the top-level [`MallowConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, GuardConfig, LogFormat, LoggingConfig, MarshalConfig};

/// Complete Mallow configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use mallow_config::MallowConfig;
///
/// let config = MallowConfig::default();
/// assert_eq!(config.marshal.inbound_key, "json");
/// assert!(config.guards.enforce_json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MallowConfig {
    /// Marshalling configuration.
    #[serde(default)]
    pub marshal: MarshalConfig,

    /// Request guard configuration.
    #[serde(default)]
    pub guards: GuardConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MallowConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use mallow_config::{MallowConfig, MarshalConfig};
    ///
    /// let config = MallowConfig::builder()
    ///     .marshal(MarshalConfig {
    ///         force_json: false,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(!config.marshal.force_json);
    /// ```
    #[must_use]
    pub fn builder() -> MallowConfigBuilder {
        MallowConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Either payload key is empty
    /// - The inbound and outbound keys are the same
    /// - A guarded method is not a standard HTTP method
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marshal = &self.marshal;

        if marshal.inbound_key.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "marshal.inbound_key",
                "must not be empty",
            ));
        }
        if marshal.outbound_key.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "marshal.outbound_key",
                "must not be empty",
            ));
        }
        if marshal.inbound_key == marshal.outbound_key {
            return Err(ConfigError::validation_error(format!(
                "marshal.inbound_key and marshal.outbound_key must differ (both are {:?})",
                marshal.inbound_key
            )));
        }

        self.guards.methods()?;

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with ANSI colors and source locations
    /// - Debug log level
    /// - Indented JSON responses
    ///
    /// # Example
    ///
    /// ```
    /// use mallow_config::MallowConfig;
    ///
    /// let config = MallowConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.marshal.pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.marshal.pretty = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting at info level
    /// - Compact JSON responses
    /// - Both guards enabled
    ///
    /// # Example
    ///
    /// ```
    /// use mallow_config::{LogFormat, MallowConfig};
    ///
    /// let config = MallowConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.marshal.pretty = false;
        config.guards.enforce_json = true;
        config.guards.reject_empty_body = true;

        config
    }
}

/// Builder for [`MallowConfig`].
#[derive(Debug, Default)]
pub struct MallowConfigBuilder {
    marshal: Option<MarshalConfig>,
    guards: Option<GuardConfig>,
    logging: Option<LoggingConfig>,
}

impl MallowConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marshalling configuration.
    #[must_use]
    pub fn marshal(mut self, marshal: MarshalConfig) -> Self {
        self.marshal = Some(marshal);
        self
    }

    /// Set the guard configuration.
    #[must_use]
    pub fn guards(mut self, guards: GuardConfig) -> Self {
        self.guards = Some(guards);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> MallowConfig {
        MallowConfig {
            marshal: self.marshal.unwrap_or_default(),
            guards: self.guards.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
