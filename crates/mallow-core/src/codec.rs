//! Body codecs.
//!
//! A [`Codec`] turns raw body bytes into structured data and back. The
//! middleware uses the codec declared by the resolved schema when there is
//! one, and the configured default codec otherwise (see [`codec_for`]).

use crate::schema::Schema;
use bytes::Bytes;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Content type produced by [`JsonCodec`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Errors raised while decoding or encoding a body.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The body is not valid UTF-8 text.
    #[error("Body was not encoded as UTF-8")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    /// The body is not syntactically valid for this codec.
    #[error("Request must be valid JSON: {0}")]
    Malformed(String),

    /// The value cannot be represented by this codec.
    #[error("Value could not be encoded: {0}")]
    Unencodable(String),
}

/// Encode/decode strategy for request and response bodies.
pub trait Codec: fmt::Debug + Send + Sync + 'static {
    /// The `Content-Type` written on responses encoded by this codec.
    fn content_type(&self) -> &str;

    /// Decodes raw body bytes into a structured value.
    fn decode(&self, body: &[u8]) -> Result<Value, CodecError>;

    /// Encodes a structured value into body bytes.
    fn encode(&self, value: &Value) -> Result<Bytes, CodecError>;
}

/// JSON codec backed by `serde_json`.
///
/// # Example
///
/// ```
/// use mallow_core::{Codec, JsonCodec};
/// use serde_json::json;
///
/// let codec = JsonCodec::new();
/// let value = codec.decode(br#"{"id": 12}"#).unwrap();
/// assert_eq!(value, json!({"id": 12}));
/// assert_eq!(&codec.encode(&value).unwrap()[..], br#"{"id":12}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Creates a codec producing compact JSON.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: false }
    }

    /// Creates a codec producing indented JSON.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> &str {
        JSON_CONTENT_TYPE
    }

    fn decode(&self, body: &[u8]) -> Result<Value, CodecError> {
        let text = std::str::from_utf8(body).map_err(CodecError::InvalidUtf8)?;
        serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    fn encode(&self, value: &Value) -> Result<Bytes, CodecError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded
            .map(Bytes::from)
            .map_err(|e| CodecError::Unencodable(e.to_string()))
    }
}

/// Returns the codec to use for a request handled with `schema`.
///
/// A schema-declared codec wins; otherwise `default` is returned.
#[must_use]
pub fn codec_for(schema: Option<&dyn Schema>, default: &Arc<dyn Codec>) -> Arc<dyn Codec> {
    schema
        .and_then(|schema| schema.codec())
        .unwrap_or_else(|| Arc::clone(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrors;
    use crate::schema::SchemaError;
    use proptest::prelude::*;
    use serde_json::json;

    #[derive(Debug)]
    struct PlainSchema;

    impl Schema for PlainSchema {
        fn load(&self, data: Value) -> Result<Value, FieldErrors> {
            Ok(data)
        }

        fn dump(&self, data: &Value) -> Result<Value, SchemaError> {
            Ok(data.clone())
        }
    }

    #[derive(Debug)]
    struct PrettySchema;

    impl Schema for PrettySchema {
        fn load(&self, data: Value) -> Result<Value, FieldErrors> {
            Ok(data)
        }

        fn dump(&self, data: &Value) -> Result<Value, SchemaError> {
            Ok(data.clone())
        }

        fn codec(&self) -> Option<Arc<dyn Codec>> {
            Some(Arc::new(JsonCodec::pretty()))
        }
    }

    #[test]
    fn test_decode_valid_json() {
        let value = JsonCodec::new()
            .decode(br#"{"name": "Camus", "works": ["The Stranger"]}"#)
            .unwrap();
        assert_eq!(value["works"][0], "The Stranger");
    }

    #[test]
    fn test_decode_malformed_json() {
        let err = JsonCodec::new().decode(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
        assert!(err.to_string().starts_with("Request must be valid JSON"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = JsonCodec::new().decode(&[0xff, 0xfe, b'{']).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
        assert_eq!(err.to_string(), "Body was not encoded as UTF-8");
    }

    #[test]
    fn test_pretty_encoding_is_indented() {
        let bytes = JsonCodec::pretty().encode(&json!({"a": 1})).unwrap();
        assert_eq!(&bytes[..], b"{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_codec_for_falls_back_to_default() {
        let default: Arc<dyn Codec> = Arc::new(JsonCodec::new());

        let chosen = codec_for(None, &default);
        assert!(Arc::ptr_eq(&chosen, &default));

        let chosen = codec_for(Some(&PlainSchema), &default);
        assert!(Arc::ptr_eq(&chosen, &default));
    }

    #[test]
    fn test_codec_for_prefers_schema_codec() {
        let default: Arc<dyn Codec> = Arc::new(JsonCodec::new());
        let chosen = codec_for(Some(&PrettySchema), &default);

        assert!(!Arc::ptr_eq(&chosen, &default));
        assert_eq!(&chosen.encode(&json!([1])).unwrap()[..], b"[\n  1\n]");
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_dumped_values_survive_encode_decode(value in arb_json()) {
            let codec = JsonCodec::new();
            let dumped = PlainSchema.dump(&value).unwrap();
            let decoded = codec.decode(&codec.encode(&dumped).unwrap()).unwrap();
            prop_assert_eq!(decoded, dumped);
        }
    }
}
