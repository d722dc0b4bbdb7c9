//! Declarative field schemas.
//!
//! [`FieldSchema`] is the bundled [`Schema`] implementation: a list of named,
//! typed fields with per-field flags. Loading validates and normalizes input,
//! collecting one list of messages per offending field. Dumping keeps the
//! declared fields and drops everything else.
//!
//! # Example
//!
//! ```
//! use mallow_core::{Field, FieldSchema, Schema};
//! use serde_json::json;
//!
//! let philosopher = FieldSchema::builder()
//!     .field("name", Field::string().required())
//!     .field("birth", Field::date())
//!     .field("works", Field::list(Field::string()))
//!     .build();
//!
//! let errors = philosopher
//!     .load(json!({"name": "Camus", "birth": "not-a-date"}))
//!     .unwrap_err();
//! assert_eq!(errors.get("birth"), Some(&["Not a valid date.".to_string()][..]));
//! ```

use crate::codec::Codec;
use crate::error::FieldErrors;
use crate::schema::{Schema, SchemaError};
use chrono::{DateTime, NaiveDate};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Field name under which errors about the input as a whole are reported.
pub const SCHEMA_ERROR_KEY: &str = "_schema";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The value type of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A JSON string.
    String,
    /// An integer, also accepted as an integral float or a numeric string.
    Integer,
    /// Any number, also accepted as a numeric string.
    Number,
    /// A boolean, also accepted as `"true"`/`"false"` or `0`/`1`.
    Boolean,
    /// An ISO-8601 calendar date (`YYYY-MM-DD`).
    Date,
    /// An RFC 3339 timestamp.
    DateTime,
    /// A list whose items all have the inner kind.
    List(Box<FieldKind>),
    /// A nested object validated by another schema.
    Nested(Arc<FieldSchema>),
    /// Any JSON value, passed through unchanged.
    Any,
}

/// A field declaration: its kind plus loading/dumping flags.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    required: bool,
    allow_null: bool,
    load_only: bool,
    dump_only: bool,
}

impl Field {
    /// Declares a field of the given kind.
    #[must_use]
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            allow_null: false,
            load_only: false,
            dump_only: false,
        }
    }

    /// Declares a string field.
    #[must_use]
    pub const fn string() -> Self {
        Self::new(FieldKind::String)
    }

    /// Declares an integer field.
    #[must_use]
    pub const fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Declares a number field.
    #[must_use]
    pub const fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    /// Declares a boolean field.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// Declares a date field.
    #[must_use]
    pub const fn date() -> Self {
        Self::new(FieldKind::Date)
    }

    /// Declares a timestamp field.
    #[must_use]
    pub const fn datetime() -> Self {
        Self::new(FieldKind::DateTime)
    }

    /// Declares a list field whose items have the kind of `item`.
    #[must_use]
    pub fn list(item: Field) -> Self {
        Self::new(FieldKind::List(Box::new(item.kind)))
    }

    /// Declares a nested object field.
    #[must_use]
    pub fn nested(schema: FieldSchema) -> Self {
        Self::new(FieldKind::Nested(Arc::new(schema)))
    }

    /// Declares a field accepting any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(FieldKind::Any)
    }

    /// Marks the field as required on load.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accepts `null` as a value on load.
    #[must_use]
    pub fn allow_null(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// Excludes the field from dumped output.
    #[must_use]
    pub fn load_only(mut self) -> Self {
        self.load_only = true;
        self
    }

    /// Ignores the field on load.
    #[must_use]
    pub fn dump_only(mut self) -> Self {
        self.dump_only = true;
        self
    }

    /// Returns the field kind.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// What loading does with input keys that match no declared field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownPolicy {
    /// Drop unknown keys from the loaded value.
    #[default]
    Exclude,
    /// Report each unknown key as `"Unknown field."`.
    Raise,
}

/// Failure of a single value: either a message for the value itself or
/// errors for its children.
enum ValueError {
    Message(&'static str),
    Children(FieldErrors),
}

impl ValueError {
    fn record(self, errors: &mut FieldErrors, field: &str) {
        match self {
            Self::Message(message) => errors.add(field, message),
            Self::Children(children) => errors.merge_prefixed(field, children),
        }
    }
}

/// A declarative schema made of typed fields.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: IndexMap<String, Field>,
    unknown: UnknownPolicy,
    many: bool,
    codec: Option<Arc<dyn Codec>>,
}

impl FieldSchema {
    /// Creates a schema builder.
    #[must_use]
    pub fn builder() -> FieldSchemaBuilder {
        FieldSchemaBuilder::default()
    }

    /// Returns the declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns `true` if this schema loads and dumps lists of objects.
    #[must_use]
    pub const fn is_many(&self) -> bool {
        self.many
    }

    fn load_object(&self, data: Value) -> Result<Value, FieldErrors> {
        let Value::Object(mut input) = data else {
            return Err(FieldErrors::single(SCHEMA_ERROR_KEY, "Invalid input type."));
        };

        let mut errors = FieldErrors::new();
        let mut output = Map::new();

        for (name, field) in &self.fields {
            let value = input.remove(name);
            if field.dump_only {
                continue;
            }
            match value {
                None if field.required => {
                    errors.add(name.as_str(), "Missing data for required field.");
                }
                None => {}
                Some(Value::Null) if field.allow_null => {
                    output.insert(name.clone(), Value::Null);
                }
                Some(Value::Null) => errors.add(name.as_str(), "Field may not be null."),
                Some(value) => match load_value(&field.kind, value) {
                    Ok(loaded) => {
                        output.insert(name.clone(), loaded);
                    }
                    Err(err) => err.record(&mut errors, name),
                },
            }
        }

        if self.unknown == UnknownPolicy::Raise {
            for key in input.keys() {
                if !self.fields.contains_key(key) {
                    errors.add(key.as_str(), "Unknown field.");
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(errors)
        }
    }

    fn dump_object(&self, data: &Value) -> Result<Value, SchemaError> {
        let input = match data {
            Value::Null => return Ok(Value::Null),
            Value::Object(input) => input,
            other => {
                return Err(SchemaError::new(format!(
                    "expected an object, found {}",
                    type_name(other)
                )))
            }
        };

        let mut output = Map::new();
        for (name, field) in &self.fields {
            if field.load_only {
                continue;
            }
            if let Some(value) = input.get(name) {
                let dumped = dump_value(&field.kind, value)
                    .map_err(|e| SchemaError::new(format!("{name}: {}", e.message)))?;
                output.insert(name.clone(), dumped);
            }
        }
        Ok(Value::Object(output))
    }
}

impl Schema for FieldSchema {
    fn load(&self, data: Value) -> Result<Value, FieldErrors> {
        if !self.many {
            return self.load_object(data);
        }

        let Value::Array(items) = data else {
            return Err(FieldErrors::single(SCHEMA_ERROR_KEY, "Invalid input type."));
        };

        let mut errors = FieldErrors::new();
        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match self.load_object(item) {
                Ok(loaded) => output.push(loaded),
                Err(item_errors) => errors.merge_prefixed(&index.to_string(), item_errors),
            }
        }

        if errors.is_empty() {
            Ok(Value::Array(output))
        } else {
            Err(errors)
        }
    }

    fn dump(&self, data: &Value) -> Result<Value, SchemaError> {
        if !self.many {
            return self.dump_object(data);
        }

        match data {
            Value::Array(items) => items
                .iter()
                .map(|item| self.dump_object(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(SchemaError::new(format!(
                "expected a list, found {}",
                type_name(other)
            ))),
        }
    }

    fn codec(&self) -> Option<Arc<dyn Codec>> {
        self.codec.clone()
    }
}

/// Builder for [`FieldSchema`].
#[derive(Debug, Default)]
pub struct FieldSchemaBuilder {
    fields: IndexMap<String, Field>,
    unknown: UnknownPolicy,
    many: bool,
    codec: Option<Arc<dyn Codec>>,
}

impl FieldSchemaBuilder {
    /// Declares a field. Redeclaring a name replaces the earlier field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Sets the policy for undeclared input keys.
    #[must_use]
    pub fn unknown(mut self, policy: UnknownPolicy) -> Self {
        self.unknown = policy;
        self
    }

    /// Makes the schema load and dump lists of objects.
    #[must_use]
    pub fn many(mut self, many: bool) -> Self {
        self.many = many;
        self
    }

    /// Requires a specific codec for bodies handled by this schema.
    #[must_use]
    pub fn codec<C: Codec>(mut self, codec: C) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> FieldSchema {
        FieldSchema {
            fields: self.fields,
            unknown: self.unknown,
            many: self.many,
            codec: self.codec,
        }
    }
}

fn load_value(kind: &FieldKind, value: Value) -> Result<Value, ValueError> {
    match kind {
        FieldKind::Any => Ok(value),
        FieldKind::String => match value {
            Value::String(_) => Ok(value),
            _ => Err(ValueError::Message("Not a valid string.")),
        },
        FieldKind::Integer => load_integer(&value)
            .map(Value::from)
            .ok_or(ValueError::Message("Not a valid integer.")),
        FieldKind::Number => load_number(&value).ok_or(ValueError::Message("Not a valid number.")),
        FieldKind::Boolean => load_boolean(&value)
            .map(Value::Bool)
            .ok_or(ValueError::Message("Not a valid boolean.")),
        FieldKind::Date => value
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(|date| Value::String(date.format(DATE_FORMAT).to_string()))
            .ok_or(ValueError::Message("Not a valid date.")),
        FieldKind::DateTime => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| Value::String(ts.to_rfc3339()))
            .ok_or(ValueError::Message("Not a valid datetime.")),
        FieldKind::List(item_kind) => {
            let Value::Array(items) = value else {
                return Err(ValueError::Message("Not a valid list."));
            };
            let mut errors = FieldErrors::new();
            let mut output = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match load_value(item_kind, item) {
                    Ok(loaded) => output.push(loaded),
                    Err(err) => err.record(&mut errors, &index.to_string()),
                }
            }
            if errors.is_empty() {
                Ok(Value::Array(output))
            } else {
                Err(ValueError::Children(errors))
            }
        }
        FieldKind::Nested(schema) => schema.load(value).map_err(ValueError::Children),
    }
}

fn load_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn load_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn load_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn dump_value(kind: &FieldKind, value: &Value) -> Result<Value, SchemaError> {
    match (kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldKind::List(item_kind), Value::Array(items)) => items
            .iter()
            .map(|item| dump_value(item_kind, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (FieldKind::Nested(schema), nested) => schema.dump(nested),
        _ => Ok(value.clone()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::json;

    fn philosopher() -> FieldSchema {
        FieldSchema::builder()
            .field("id", Field::string().dump_only())
            .field("name", Field::string().required())
            .field("birth", Field::date())
            .field("death", Field::date().allow_null())
            .field("schools", Field::list(Field::string()))
            .field("works", Field::list(Field::string()))
            .build()
    }

    fn messages(errors: &FieldErrors, field: &str) -> Vec<String> {
        errors.get(field).map(<[String]>::to_vec).unwrap_or_default()
    }

    #[test]
    fn test_load_valid_object() {
        let loaded = philosopher()
            .load(json!({
                "name": "Søren Kierkegaard",
                "birth": "1813-05-05",
                "schools": ["existentialism"],
            }))
            .unwrap();

        assert_eq!(
            loaded,
            json!({
                "name": "Søren Kierkegaard",
                "birth": "1813-05-05",
                "schools": ["existentialism"],
            })
        );
    }

    #[test]
    fn test_load_invalid_date() {
        let errors = philosopher()
            .load(json!({"name": "Camus", "birth": "not-a-date"}))
            .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(messages(&errors, "birth"), vec!["Not a valid date."]);
    }

    #[test]
    fn test_load_missing_required_field() {
        let errors = philosopher().load(json!({"birth": "1913-11-07"})).unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["Missing data for required field."]);
    }

    #[test]
    fn test_load_null_handling() {
        let loaded = philosopher()
            .load(json!({"name": "Camus", "death": null}))
            .unwrap();
        assert_eq!(loaded["death"], Value::Null);

        let errors = philosopher().load(json!({"name": null})).unwrap_err();
        assert_eq!(messages(&errors, "name"), vec!["Field may not be null."]);
    }

    #[test]
    fn test_load_non_object_input() {
        let errors = philosopher().load(json!(["Camus"])).unwrap_err();
        assert_eq!(messages(&errors, SCHEMA_ERROR_KEY), vec!["Invalid input type."]);
    }

    #[test]
    fn test_load_list_item_errors_are_indexed() {
        let errors = philosopher()
            .load(json!({"name": "Camus", "works": ["The Stranger", 7, "The Plague", false]}))
            .unwrap_err();

        assert_eq!(messages(&errors, "works.1"), vec!["Not a valid string."]);
        assert_eq!(messages(&errors, "works.3"), vec!["Not a valid string."]);
        assert!(errors.get("works.0").is_none());
    }

    #[test]
    fn test_load_nested_errors_are_prefixed() {
        let schema = FieldSchema::builder()
            .field(
                "address",
                Field::nested(
                    FieldSchema::builder()
                        .field("city", Field::string().required())
                        .build(),
                ),
            )
            .build();

        let errors = schema.load(json!({"address": {}})).unwrap_err();
        assert_eq!(
            messages(&errors, "address.city"),
            vec!["Missing data for required field."]
        );
    }

    #[test]
    fn test_load_coerces_scalars() {
        let schema = FieldSchema::builder()
            .field("age", Field::integer())
            .field("height", Field::number())
            .field("alive", Field::boolean())
            .build();

        let loaded = schema
            .load(json!({"age": "46", "height": "1.74", "alive": "false"}))
            .unwrap();
        assert_eq!(loaded, json!({"age": 46, "height": 1.74, "alive": false}));

        let errors = schema
            .load(json!({"age": 46.5, "height": "tall", "alive": "maybe"}))
            .unwrap_err();
        assert_eq!(messages(&errors, "age"), vec!["Not a valid integer."]);
        assert_eq!(messages(&errors, "height"), vec!["Not a valid number."]);
        assert_eq!(messages(&errors, "alive"), vec!["Not a valid boolean."]);
    }

    #[test]
    fn test_load_datetime() {
        let schema = FieldSchema::builder()
            .field("seen", Field::datetime())
            .build();

        assert!(schema.load(json!({"seen": "1960-01-04T13:55:00+01:00"})).is_ok());
        let errors = schema.load(json!({"seen": "yesterday"})).unwrap_err();
        assert_eq!(messages(&errors, "seen"), vec!["Not a valid datetime."]);
    }

    #[test]
    fn test_unknown_fields() {
        let input = json!({"name": "Camus", "nationality": "French"});

        let loaded = philosopher().load(input.clone()).unwrap();
        assert!(loaded.get("nationality").is_none());

        let strict = FieldSchema::builder()
            .field("name", Field::string())
            .unknown(UnknownPolicy::Raise)
            .build();
        let errors = strict.load(input).unwrap_err();
        assert_eq!(messages(&errors, "nationality"), vec!["Unknown field."]);
    }

    #[test]
    fn test_dump_only_fields_are_ignored_on_load() {
        let loaded = philosopher()
            .load(json!({"id": "forged", "name": "Camus"}))
            .unwrap();
        assert_eq!(loaded, json!({"name": "Camus"}));
    }

    #[test]
    fn test_dump_keeps_declared_fields() {
        let dumped = philosopher()
            .dump(&json!({"id": 12, "name": "Camus", "password": "secret"}))
            .unwrap();
        assert_eq!(dumped, json!({"id": 12, "name": "Camus"}));
    }

    #[test]
    fn test_dump_skips_load_only_fields() {
        let schema = FieldSchema::builder()
            .field("name", Field::string())
            .field("password", Field::string().load_only())
            .build();

        let dumped = schema.dump(&json!({"name": "Camus", "password": "x"})).unwrap();
        assert_eq!(dumped, json!({"name": "Camus"}));
    }

    #[test]
    fn test_dump_rejects_scalars() {
        let err = philosopher().dump(&json!(42)).unwrap_err();
        assert!(err.message.contains("expected an object"));
        assert_eq!(philosopher().dump(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_many_schema() {
        let schema = FieldSchema::builder()
            .field("name", Field::string().required())
            .many(true)
            .build();

        let loaded = schema.load(json!([{"name": "Camus"}, {"name": "Sartre"}])).unwrap();
        assert_eq!(loaded.as_array().unwrap().len(), 2);

        let errors = schema.load(json!([{"name": "Camus"}, {}])).unwrap_err();
        assert_eq!(messages(&errors, "1.name"), vec!["Missing data for required field."]);

        let dumped = schema.dump(&json!([{"name": "Camus", "x": 1}])).unwrap();
        assert_eq!(dumped, json!([{"name": "Camus"}]));
    }

    #[test]
    fn test_schema_codec() {
        assert!(philosopher().codec().is_none());

        let schema = FieldSchema::builder().codec(JsonCodec::pretty()).build();
        assert!(schema.codec().is_some());
    }

    #[test]
    fn test_field_names_keep_declaration_order() {
        let names: Vec<_> = philosopher().field_names().map(str::to_string).collect();
        assert_eq!(names, ["id", "name", "birth", "death", "schools", "works"]);
    }
}
