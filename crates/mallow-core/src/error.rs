//! Error types for Mallow.
//!
//! This module provides the [`MallowError`] type, the single error type the
//! middleware stages produce. Each variant maps onto one HTTP error condition,
//! and every error can be rendered as a JSON [`ErrorEnvelope`].
//!
//! | `ErrorKind`            | Status | Code                     |
//! |------------------------|--------|--------------------------|
//! | `BadRequest`           | 400    | `BAD_REQUEST`            |
//! | `NotAcceptable`        | 406    | `NOT_ACCEPTABLE`         |
//! | `UnsupportedMediaType` | 415    | `UNSUPPORTED_MEDIA_TYPE` |
//! | `UnprocessableEntity`  | 422    | `UNPROCESSABLE_ENTITY`   |
//! | `Internal`             | 500    | `INTERNAL_ERROR`         |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`MallowError`].
pub type MallowResult<T> = Result<T, MallowError>;

/// The HTTP error conditions the middleware can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request body could not be decoded, or the request is malformed.
    BadRequest,
    /// The client does not accept JSON responses.
    NotAcceptable,
    /// The request declares a non-JSON content type.
    UnsupportedMediaType,
    /// The decoded body was rejected by a schema.
    UnprocessableEntity,
    /// The response could not be serialized.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind of error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::NotAcceptable => "NOT_ACCEPTABLE",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Which error a body-bearing request with a non-JSON content type receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypePolicy {
    /// Reject with `415 Unsupported Media Type`.
    #[default]
    UnsupportedMediaType,
    /// Reject with `400 Bad Request`.
    BadRequest,
}

impl ContentTypePolicy {
    /// Builds the rejection error for this policy.
    #[must_use]
    pub fn rejection(&self, message: impl Into<String>) -> MallowError {
        match self {
            Self::UnsupportedMediaType => MallowError::unsupported_media_type(message),
            Self::BadRequest => MallowError::bad_request(message),
        }
    }
}

/// Standard error type for Mallow.
///
/// # Example
///
/// ```
/// use mallow_core::{ErrorKind, MallowError};
///
/// fn require_body(body: &[u8]) -> Result<(), MallowError> {
///     if body.is_empty() {
///         return Err(MallowError::bad_request("A request body is required"));
///     }
///     Ok(())
/// }
///
/// let err = require_body(b"").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
/// ```
#[derive(Error, Debug)]
pub enum MallowError {
    /// The request could not be decoded or is otherwise malformed.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The client's `Accept` header excludes JSON.
    #[error("Not acceptable: {message}")]
    NotAcceptable {
        /// Human-readable error message.
        message: String,
    },

    /// The request declares a content type the server cannot process.
    #[error("Unsupported media type: {message}")]
    UnsupportedMediaType {
        /// Human-readable error message.
        message: String,
    },

    /// A schema rejected the decoded request body.
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: FieldErrors,
    },

    /// The response could not be serialized.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MallowError {
    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not acceptable error.
    #[must_use]
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::NotAcceptable {
            message: message.into(),
        }
    }

    /// Creates an unsupported media type error.
    #[must_use]
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::UnsupportedMediaType {
            message: message.into(),
        }
    }

    /// Creates a validation error carrying per-field messages.
    #[must_use]
    pub fn unprocessable(field_errors: FieldErrors) -> Self {
        Self::UnprocessableEntity {
            message: "The request body failed validation".to_string(),
            field_errors,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotAcceptable { .. } => ErrorKind::NotAcceptable,
            Self::UnsupportedMediaType { .. } => ErrorKind::UnsupportedMediaType,
            Self::UnprocessableEntity { .. } => ErrorKind::UnprocessableEntity,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Returns the client-facing message, without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::NotAcceptable { message }
            | Self::UnsupportedMediaType { message }
            | Self::UnprocessableEntity { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Returns the field errors of a validation failure.
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::UnprocessableEntity { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.kind().code().to_string(),
                message: self.message().to_string(),
                details: self
                    .field_errors()
                    .and_then(|errors| serde_json::to_value(errors).ok()),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Field-specific validation errors.
///
/// Serializes transparently as a mapping of field name to messages, e.g.
/// `{"birth": ["Not a valid date."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates errors holding a single message for a single field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Moves every error of `other` into `self`, prefixing field names with
    /// `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.fields {
            self.fields
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    /// Returns the messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Per-field validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
