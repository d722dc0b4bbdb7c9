//! Schemas derived from serde types.

use crate::codec::Codec;
use crate::error::FieldErrors;
use crate::field::SCHEMA_ERROR_KEY;
use crate::schema::{Schema, SchemaError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A [`Schema`] backed by a type implementing `Serialize + DeserializeOwned`.
///
/// Loading deserializes the input into `T` and serializes it back, so the
/// handler receives the value exactly as `T` normalizes it. Deserialization
/// errors are reported under the `_schema` key.
///
/// # Example
///
/// ```
/// use mallow_core::{Schema, TypedSchema};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Serialize, Deserialize)]
/// struct Philosopher {
///     name: String,
///     #[serde(default)]
///     works: Vec<String>,
/// }
///
/// let schema = TypedSchema::<Philosopher>::new();
/// let loaded = schema.load(json!({"name": "Camus"})).unwrap();
/// assert_eq!(loaded, json!({"name": "Camus", "works": []}));
/// ```
pub struct TypedSchema<T> {
    codec: Option<Arc<dyn Codec>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Creates a schema for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            codec: None,
            _marker: PhantomData,
        }
    }

    /// Requires a specific codec for bodies handled by this schema.
    #[must_use]
    pub fn with_codec<C: Codec>(mut self, codec: C) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("type", &std::any::type_name::<T>())
            .field("codec", &self.codec)
            .finish()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn load(&self, data: Value) -> Result<Value, FieldErrors> {
        let typed: T = serde_json::from_value(data)
            .map_err(|e| FieldErrors::single(SCHEMA_ERROR_KEY, e.to_string()))?;
        serde_json::to_value(typed).map_err(|e| FieldErrors::single(SCHEMA_ERROR_KEY, e.to_string()))
    }

    fn dump(&self, data: &Value) -> Result<Value, SchemaError> {
        let typed: T =
            serde_json::from_value(data.clone()).map_err(|e| SchemaError::new(e.to_string()))?;
        serde_json::to_value(typed).map_err(|e| SchemaError::new(e.to_string()))
    }

    fn codec(&self) -> Option<Arc<dyn Codec>> {
        self.codec.clone()
    }
}
