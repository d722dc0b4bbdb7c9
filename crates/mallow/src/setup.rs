//! Building the pipeline from configuration.

use mallow_config::{ConfigError, GuardConfig, MallowConfig, MarshalConfig};
use mallow_core::JsonCodec;
use mallow_middleware::stages::JsonEnforcerMiddleware;
use mallow_middleware::{MarshalOptions, Pipeline};
use mallow_telemetry::TelemetryError;

/// Translates the `[marshal]` section into stage options.
#[must_use]
pub fn marshal_options(config: &MarshalConfig) -> MarshalOptions {
    let codec = if config.pretty {
        JsonCodec::pretty()
    } else {
        JsonCodec::new()
    };

    MarshalOptions::new()
        .inbound_key(config.inbound_key.as_str())
        .outbound_key(config.outbound_key.as_str())
        .force_json(config.force_json)
        .codec(codec)
}

/// Builds the JSON guard from the `[guards]` section, or `None` when it is
/// switched off.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if a guarded method is unknown.
pub fn json_enforcer(config: &GuardConfig) -> Result<Option<JsonEnforcerMiddleware>, ConfigError> {
    if !config.enforce_json {
        return Ok(None);
    }

    Ok(Some(
        JsonEnforcerMiddleware::new()
            .methods(config.methods()?)
            .policy(config.content_type_policy),
    ))
}

/// Assembles the standard pipeline described by `config`.
///
/// # Errors
///
/// Returns `ConfigError` if the configuration does not validate.
///
/// # Example
///
/// ```
/// use mallow::config::MallowConfig;
///
/// let mut config = MallowConfig::default();
/// config.guards.enforce_json = false;
///
/// let pipeline = mallow::build_pipeline(&config).unwrap();
/// assert_eq!(
///     pipeline.stage_names(),
///     vec!["empty_body", "deserialize", "serialize"]
/// );
/// ```
pub fn build_pipeline(config: &MallowConfig) -> Result<Pipeline, ConfigError> {
    config.validate()?;

    let pipeline = Pipeline::standard(
        marshal_options(&config.marshal),
        json_enforcer(&config.guards)?,
        config.guards.reject_empty_body,
    );

    tracing::debug!(
        stages = ?pipeline.stage_names(),
        inbound_key = %config.marshal.inbound_key,
        outbound_key = %config.marshal.outbound_key,
        force_json = config.marshal.force_json,
        "built pipeline"
    );

    Ok(pipeline)
}

/// Installs the global log subscriber described by the `[logging]` section.
///
/// # Errors
///
/// Returns `TelemetryError` if the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(config: &MallowConfig) -> Result<(), TelemetryError> {
    mallow_telemetry::init_logging(&config.logging.to_log_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{header, Method, StatusCode};
    use http_body_util::Full;
    use mallow_config::ConfigLoader;
    use mallow_core::{ContentTypePolicy, Field, FieldSchema, SchemaSet};
    use mallow_middleware::{response_bytes, MiddlewareContext, Response};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_default_config_builds_full_pipeline() {
        let pipeline = build_pipeline(&MallowConfig::default()).unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec!["json_enforcement", "empty_body", "deserialize", "serialize"]
        );
    }

    #[test]
    fn test_guards_can_be_disabled() {
        let config = ConfigLoader::new()
            .with_string(
                "[guards]\nenforce_json = false\nreject_empty_body = false\n",
                "toml",
            )
            .unwrap()
            .load()
            .unwrap();

        let pipeline = build_pipeline(&config).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["deserialize", "serialize"]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = MallowConfig::default();
        config.guards.json_methods = vec!["BREW".to_string()];
        assert!(build_pipeline(&config).is_err());

        config.guards.enforce_json = false;
        assert!(json_enforcer(&config.guards).unwrap().is_none());
    }

    #[test]
    fn test_marshal_options_follow_config() {
        let options = marshal_options(&MarshalConfig {
            inbound_key: "body".to_string(),
            outbound_key: "reply".to_string(),
            force_json: false,
            pretty: true,
        });

        assert_eq!(options.inbound_key_name(), "body");
        assert_eq!(options.outbound_key_name(), "reply");
        assert!(!options.is_force_json());
    }

    #[tokio::test]
    async fn test_configured_pipeline_end_to_end() {
        let toml = r#"
            [marshal]
            pretty = true

            [guards]
            json_methods = ["POST"]
            content_type_policy = "bad_request"
        "#;
        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.guards.content_type_policy, ContentTypePolicy::BadRequest);
        let pipeline = build_pipeline(&config).unwrap();

        let schemas = SchemaSet::new().with_schema(
            FieldSchema::builder()
                .field("id", Field::integer().dump_only())
                .field("name", Field::string().required())
                .build(),
        );

        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/philosophers")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Full::new(Bytes::from_static(br#"{"name": "Hume"}"#)))
            .unwrap();
        let mut ctx = MiddlewareContext::new().with_resource(Arc::new(schemas.clone()));
        let response = pipeline
            .process(&mut ctx, request, |_ctx, _req| {
                Box::pin(async { Response::new(Full::new(Bytes::new())) })
            })
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = http::Request::builder()
            .method(Method::POST)
            .uri("/philosophers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(br#"{"name": "Hume"}"#)))
            .unwrap();
        let mut ctx = MiddlewareContext::new().with_resource(Arc::new(schemas));
        let response = pipeline
            .process(&mut ctx, request, |ctx, _req| {
                let mut created = ctx.payloads_mut().take_inbound().unwrap_or_default();
                created["id"] = json!(1);
                ctx.payloads_mut().set_outbound(created);
                Box::pin(async { Response::new(Full::new(Bytes::new())) })
            })
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            &response_bytes(response).await[..],
            b"{\n  \"id\": 1,\n  \"name\": \"Hume\"\n}"
        );
    }
}
