//! Marshalling options and the decision logic shared by the marshal stages.
//!
//! [`MarshalOptions`] holds the constructor-time configuration: slot names,
//! the `force_json` flag, and the default codec. Its two methods implement the
//! request-phase and response-phase decisions independently of HTTP plumbing:
//!
//! | Schema | `force_json` | Request phase            | Response phase               |
//! |--------|--------------|--------------------------|------------------------------|
//! | yes    | any          | decode, `load`           | `dump`, encode (schema codec)|
//! | no     | on           | decode (default codec)   | encode (default codec)       |
//! | no     | off          | untouched                | untouched                    |

use bytes::Bytes;
use mallow_core::{
    codec_for, Codec, JsonCodec, MallowError, MallowResult, Schema, DEFAULT_INBOUND_KEY,
    DEFAULT_OUTBOUND_KEY,
};
use serde_json::Value;
use std::sync::Arc;

/// A serialized response body and the content type it was encoded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The encoded bytes.
    pub body: Bytes,
    /// The codec's content type.
    pub content_type: String,
}

/// Configuration of the marshal stages.
///
/// # Example
///
/// ```
/// use mallow_middleware::MarshalOptions;
///
/// let options = MarshalOptions::new().inbound_key("body").force_json(false);
/// assert_eq!(options.inbound_key_name(), "body");
/// assert_eq!(options.outbound_key_name(), "result");
/// assert!(!options.is_force_json());
/// ```
#[derive(Debug, Clone)]
pub struct MarshalOptions {
    inbound_key: String,
    outbound_key: String,
    force_json: bool,
    codec: Arc<dyn Codec>,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MarshalOptions {
    /// Creates options with the defaults: slots `json` and `result`,
    /// `force_json` on, compact JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inbound_key: DEFAULT_INBOUND_KEY.to_string(),
            outbound_key: DEFAULT_OUTBOUND_KEY.to_string(),
            force_json: true,
            codec: Arc::new(JsonCodec::new()),
        }
    }

    /// Sets the name of the inbound slot.
    #[must_use]
    pub fn inbound_key(mut self, key: impl Into<String>) -> Self {
        self.inbound_key = key.into();
        self
    }

    /// Sets the name of the outbound slot.
    #[must_use]
    pub fn outbound_key(mut self, key: impl Into<String>) -> Self {
        self.outbound_key = key.into();
        self
    }

    /// Sets whether resources without a schema are still treated as JSON.
    #[must_use]
    pub fn force_json(mut self, force: bool) -> Self {
        self.force_json = force;
        self
    }

    /// Sets the default codec.
    #[must_use]
    pub fn codec<C: Codec>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Returns the inbound slot name.
    #[must_use]
    pub fn inbound_key_name(&self) -> &str {
        &self.inbound_key
    }

    /// Returns the outbound slot name.
    #[must_use]
    pub fn outbound_key_name(&self) -> &str {
        &self.outbound_key
    }

    /// Returns whether schema-less resources are treated as JSON.
    #[must_use]
    pub const fn is_force_json(&self) -> bool {
        self.force_json
    }

    /// Returns the default codec.
    #[must_use]
    pub fn default_codec(&self) -> &Arc<dyn Codec> {
        &self.codec
    }

    /// Turns a raw request body into the value stored in the inbound slot.
    ///
    /// Returns `Ok(None)` when nothing should be stored: the body is empty, or
    /// there is no schema and `force_json` is off.
    ///
    /// # Errors
    ///
    /// - [`MallowError::BadRequest`] if the body cannot be decoded
    /// - [`MallowError::UnprocessableEntity`] if the schema rejects it
    pub fn deserialize(
        &self,
        schema: Option<&dyn Schema>,
        body: &[u8],
    ) -> MallowResult<Option<Value>> {
        if body.is_empty() {
            return Ok(None);
        }

        match schema {
            Some(schema) => {
                let codec = codec_for(Some(schema), &self.codec);
                let decoded = self.decode(&codec, body)?;
                let loaded = schema.load(decoded).map_err(|errors| {
                    tracing::debug!(fields = errors.len(), "schema rejected request body");
                    MallowError::unprocessable(errors)
                })?;
                Ok(Some(loaded))
            }
            None if self.force_json => self.decode(&self.codec, body).map(Some),
            None => Ok(None),
        }
    }

    /// Turns the outbound value into a response body.
    ///
    /// Returns `Ok(None)` when the response should be left untouched because
    /// there is no schema and `force_json` is off.
    ///
    /// # Errors
    ///
    /// [`MallowError::Internal`] if the schema cannot dump the value or the
    /// codec cannot encode it.
    pub fn serialize(
        &self,
        schema: Option<&dyn Schema>,
        value: &Value,
    ) -> MallowResult<Option<Encoded>> {
        let (codec, dumped) = match schema {
            Some(schema) => {
                let dumped = schema.dump(value).map_err(|e| {
                    MallowError::internal_with_source("Could not serialize response", e)
                })?;
                (codec_for(Some(schema), &self.codec), dumped)
            }
            None if self.force_json => (Arc::clone(&self.codec), value.clone()),
            None => return Ok(None),
        };

        let body = codec
            .encode(&dumped)
            .map_err(|e| MallowError::internal_with_source("Could not serialize response", e))?;

        Ok(Some(Encoded {
            body,
            content_type: codec.content_type().to_string(),
        }))
    }

    fn decode(&self, codec: &Arc<dyn Codec>, body: &[u8]) -> MallowResult<Value> {
        codec
            .decode(body)
            .map_err(|e| MallowError::bad_request(e.to_string()))
    }
}
