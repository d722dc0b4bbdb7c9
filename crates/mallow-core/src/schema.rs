//! Schemas, resources, and schema resolution.
//!
//! A [`Resource`] declares the schemas that apply to it through a
//! [`SchemaSet`]: an optional generic schema plus any number of
//! method-specific schemas. [`resolve_schema`] picks the one that applies to a
//! request.
//!
//! # Resolution order
//!
//! 1. The schema registered for the request method
//! 2. The generic schema
//! 3. No schema
//!
//! # Example
//!
//! ```
//! use mallow_core::{resolve_schema, Field, FieldSchema, Resource, SchemaSet};
//! use http::Method;
//!
//! struct Philosophers {
//!     schemas: SchemaSet,
//! }
//!
//! impl Resource for Philosophers {
//!     fn schemas(&self) -> &SchemaSet {
//!         &self.schemas
//!     }
//! }
//!
//! let resource = Philosophers {
//!     schemas: SchemaSet::new()
//!         .with_schema(FieldSchema::builder().field("name", Field::string()).build())
//!         .with_method_schema(Method::POST, FieldSchema::builder().build()),
//! };
//!
//! assert!(resolve_schema(&resource, &Method::GET).is_some());
//! ```

use crate::codec::Codec;
use crate::error::FieldErrors;
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error raised when a schema cannot dump a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not serialize value: {message}")]
pub struct SchemaError {
    /// Human-readable description of the failure.
    pub message: String,
}

impl SchemaError {
    /// Creates a new dump error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A validation and transformation schema.
///
/// `load` validates decoded request data, `dump` converts handler output into
/// a JSON-serializable structure.
pub trait Schema: fmt::Debug + Send + Sync + 'static {
    /// Validates and transforms decoded input.
    ///
    /// Returns the per-field error messages when the input is rejected.
    fn load(&self, data: Value) -> Result<Value, FieldErrors>;

    /// Converts handler output into its serialized form.
    fn dump(&self, data: &Value) -> Result<Value, SchemaError>;

    /// A codec this schema requires instead of the default one.
    fn codec(&self) -> Option<Arc<dyn Codec>> {
        None
    }
}

/// The schemas declared by a resource.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    generic: Option<Arc<dyn Schema>>,
    by_method: HashMap<Method, Arc<dyn Schema>>,
}

impl SchemaSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema used for every method without a specific schema.
    #[must_use]
    pub fn with_schema<S: Schema>(mut self, schema: S) -> Self {
        self.generic = Some(Arc::new(schema));
        self
    }

    /// Sets an already shared generic schema.
    #[must_use]
    pub fn with_shared_schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.generic = Some(schema);
        self
    }

    /// Sets the schema used for `method`.
    #[must_use]
    pub fn with_method_schema<S: Schema>(mut self, method: Method, schema: S) -> Self {
        self.by_method.insert(method, Arc::new(schema));
        self
    }

    /// Sets an already shared schema for `method`.
    #[must_use]
    pub fn with_shared_method_schema(mut self, method: Method, schema: Arc<dyn Schema>) -> Self {
        self.by_method.insert(method, schema);
        self
    }

    /// Returns the generic schema.
    #[must_use]
    pub fn generic(&self) -> Option<&Arc<dyn Schema>> {
        self.generic.as_ref()
    }

    /// Returns the schema registered for exactly `method`.
    #[must_use]
    pub fn for_method(&self, method: &Method) -> Option<&Arc<dyn Schema>> {
        self.by_method.get(method)
    }

    /// Returns the schema applying to `method`.
    #[must_use]
    pub fn resolve(&self, method: &Method) -> Option<Arc<dyn Schema>> {
        self.for_method(method).or(self.generic.as_ref()).cloned()
    }

    /// Returns `true` if no schema is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generic.is_none() && self.by_method.is_empty()
    }
}

/// A request handler target that may declare schemas.
pub trait Resource: Send + Sync + 'static {
    /// The schemas declared by this resource.
    fn schemas(&self) -> &SchemaSet;
}

impl Resource for SchemaSet {
    fn schemas(&self) -> &SchemaSet {
        self
    }
}

/// Resolves the schema that applies to `resource` for `method`.
///
/// Absence is a normal outcome and is never an error.
#[must_use]
pub fn resolve_schema(resource: &dyn Resource, method: &Method) -> Option<Arc<dyn Schema>> {
    let schema = resource.schemas().resolve(method);
    tracing::debug!(
        method = %method,
        found = schema.is_some(),
        "resolved resource schema"
    );
    schema
}
