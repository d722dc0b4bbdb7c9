//! # Mallow Core
//!
//! Core types and traits for the Mallow body (de)serialization middleware.
//!
//! This crate provides the building blocks the middleware stages are made of:
//!
//! - [`Schema`] - Validation (`load`) and serialization (`dump`) contract
//! - [`Resource`] / [`SchemaSet`] - Per-method schema declarations and [`resolve_schema`]
//! - [`Codec`] / [`JsonCodec`] - Body encoding strategy and [`codec_for`]
//! - [`FieldSchema`] / [`TypedSchema`] - Bundled schema implementations
//! - [`Payloads`] - The typed inbound/outbound slots of a request
//! - [`MallowError`] - Standard error type with HTTP status mapping

#![doc(html_root_url = "https://docs.rs/mallow-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
mod context;
mod error;
pub mod field;
pub mod schema;
mod typed;

pub use codec::{codec_for, Codec, CodecError, JsonCodec, JSON_CONTENT_TYPE};
pub use context::{Payloads, RequestId, DEFAULT_INBOUND_KEY, DEFAULT_OUTBOUND_KEY};
pub use error::{ContentTypePolicy, ErrorDetail, ErrorEnvelope, ErrorKind, FieldErrors, MallowError, MallowResult};
pub use field::{Field, FieldKind, FieldSchema, FieldSchemaBuilder, UnknownPolicy};
pub use schema::{resolve_schema, Resource, Schema, SchemaError, SchemaSet};
pub use typed::TypedSchema;
