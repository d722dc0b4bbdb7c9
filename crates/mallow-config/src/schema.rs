//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use http::Method;
use mallow_core::{ContentTypePolicy, DEFAULT_INBOUND_KEY, DEFAULT_OUTBOUND_KEY};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Methods that may appear in [`GuardConfig::json_methods`].
const KNOWN_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Marshalling configuration section.
///
/// Controls where deserialized bodies are stored and how schema-less
/// resources are treated.
///
/// # Example
///
/// ```
/// use mallow_config::MarshalConfig;
///
/// let config = MarshalConfig {
///     inbound_key: "body".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.outbound_key, "result");
/// assert!(config.force_json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MarshalConfig {
    /// Name of the slot holding the deserialized request body.
    #[serde(default = "default_inbound_key")]
    pub inbound_key: String,

    /// Name of the slot holding the value to serialize.
    #[serde(default = "default_outbound_key")]
    pub outbound_key: String,

    /// Treat bodies as JSON even when the resource declares no schema.
    #[serde(default = "default_true")]
    pub force_json: bool,

    /// Indent JSON output.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            inbound_key: default_inbound_key(),
            outbound_key: default_outbound_key(),
            force_json: true,
            pretty: false,
        }
    }
}

fn default_inbound_key() -> String {
    DEFAULT_INBOUND_KEY.to_string()
}

fn default_outbound_key() -> String {
    DEFAULT_OUTBOUND_KEY.to_string()
}

/// Guard configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Run the JSON content negotiation guard.
    #[serde(default = "default_true")]
    pub enforce_json: bool,

    /// Methods whose requests must declare a JSON content type.
    #[serde(default = "default_json_methods")]
    pub json_methods: Vec<String>,

    /// Error returned for a non-JSON content type.
    #[serde(default)]
    pub content_type_policy: ContentTypePolicy,

    /// Run the empty body guard.
    #[serde(default = "default_true")]
    pub reject_empty_body: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enforce_json: true,
            json_methods: default_json_methods(),
            content_type_policy: ContentTypePolicy::default(),
            reject_empty_body: true,
        }
    }
}

impl GuardConfig {
    /// Parses [`json_methods`](Self::json_methods) into HTTP methods.
    ///
    /// Method names are matched case-insensitively against the standard
    /// HTTP methods.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a name that is not a standard
    /// HTTP method.
    pub fn methods(&self) -> Result<Vec<Method>, ConfigError> {
        self.json_methods
            .iter()
            .map(|name| {
                let upper = name.trim().to_ascii_uppercase();
                if !KNOWN_METHODS.contains(&upper.as_str()) {
                    return Err(ConfigError::invalid_value(
                        "guards.json_methods",
                        format!("unknown HTTP method: {name}"),
                    ));
                }
                Method::from_bytes(upper.as_bytes()).map_err(|e| {
                    ConfigError::invalid_value("guards.json_methods", e.to_string())
                })
            })
            .collect()
    }
}

fn default_json_methods() -> Vec<String> {
    vec!["POST".to_string(), "PUT".to_string(), "PATCH".to_string()]
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log filter directive (e.g. `info` or `mallow_middleware=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's logging options.
    #[must_use]
    pub fn to_log_config(&self) -> mallow_telemetry::LogConfig {
        mallow_telemetry::LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            ansi: self.ansi_enabled,
            file_line_info: self.include_location,
            ..mallow_telemetry::LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_config_default() {
        let config = MarshalConfig::default();
        assert_eq!(config.inbound_key, "json");
        assert_eq!(config.outbound_key, "result");
        assert!(config.force_json);
        assert!(!config.pretty);
    }

    #[test]
    fn test_marshal_config_deserialize() {
        let toml = r#"
            inbound_key = "body"
            force_json = false
        "#;
        let config: MarshalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.inbound_key, "body");
        assert!(!config.force_json);
        // Defaults applied
        assert_eq!(config.outbound_key, "result");
    }

    #[test]
    fn test_marshal_config_unknown_field_rejected() {
        let toml = r#"
            inbound_key = "body"
            req_key = "json"
        "#;
        let result: Result<MarshalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_guard_config_default() {
        let config = GuardConfig::default();
        assert!(config.enforce_json);
        assert!(config.reject_empty_body);
        assert_eq!(config.content_type_policy, ContentTypePolicy::UnsupportedMediaType);
        assert_eq!(
            config.methods().unwrap(),
            vec![Method::POST, Method::PUT, Method::PATCH]
        );
    }

    #[test]
    fn test_guard_config_policy_deserialize() {
        let toml = r#"
            content_type_policy = "bad_request"
            json_methods = ["post", "Delete"]
        "#;
        let config: GuardConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content_type_policy, ContentTypePolicy::BadRequest);
        assert_eq!(config.methods().unwrap(), vec![Method::POST, Method::DELETE]);
    }

    #[test]
    fn test_guard_config_unknown_method() {
        let config = GuardConfig {
            json_methods: vec!["POST".to_string(), "YEET".to_string()],
            ..Default::default()
        };
        let err = config.methods().unwrap_err();
        assert!(err.to_string().contains("YEET"));
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_log_format_deserialize() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(format, LogFormat::Json);

        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
    }

    #[test]
    fn test_to_log_config() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            ..Default::default()
        };

        let log = config.to_log_config();
        assert_eq!(log.level, "debug");
        assert!(!log.json_format);
        assert!(log.file_line_info);
    }
}
