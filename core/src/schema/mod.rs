#![deny(missing_docs)]

//! # Schema Service
//!
//! Translates reflected types into JSON Schema and owns the table of named
//! definitions for one document build. The pipeline only talks to the
//! [`SchemaResolver`] trait; [`JsonSchemaGenerator`] is the default
//! implementation.

pub mod generator;

pub use generator::JsonSchemaGenerator;

use crate::descriptor::{Attribute, Primitive, TypeRef};
use crate::error::AppResult;
use crate::settings::SchemaType;
use indexmap::IndexMap;
use serde_json::{json, Value};

/// A reference to a named schema definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    /// Definition name.
    pub name: String,
    /// Full JSON pointer (`#/definitions/Person`).
    pub pointer: String,
}

impl SchemaRef {
    /// Creates a reference for the given dialect.
    pub fn new(name: impl Into<String>, schema_type: SchemaType) -> Self {
        let name = name.into();
        let pointer = format!("{}{}", schema_type.definitions_pointer(), name);
        Self { name, pointer }
    }

    /// The `$ref` schema object.
    pub fn to_value(&self) -> Value {
        json!({ "$ref": self.pointer })
    }
}

/// Type to schema translation with reference reuse.
///
/// Within one document build, the same `(type, is_dictionary_key)` pair must
/// always resolve to the same reference.
pub trait SchemaResolver {
    /// Produces the schema for a type; named types come back as references.
    ///
    /// Nullability of `ty` itself is not applied; callers carry it separately
    /// because the dialects place it differently.
    fn generate(&mut self, ty: &TypeRef, attributes: &[Attribute]) -> AppResult<Value>;

    /// Whether a definition has already been registered for the type.
    fn has_schema(&self, ty: &TypeRef, is_dictionary_key: bool) -> bool;

    /// Resolves or registers the named definition for the type.
    fn get_schema(&mut self, ty: &TypeRef, is_dictionary_key: bool) -> AppResult<SchemaRef>;

    /// Definitions registered so far.
    fn definitions(&self) -> &IndexMap<String, Value>;

    /// Moves the registered definitions out of the resolver.
    fn take_definitions(&mut self) -> IndexMap<String, Value>;

    /// Dialect the produced schemas target.
    fn schema_type(&self) -> SchemaType;
}

/// Marks a schema as nullable in the given dialect.
///
/// OpenAPI 3.0 has `nullable`, but siblings of `$ref` are ignored there, so a
/// reference is wrapped in a single-element `oneOf`. Swagger 2.0 has no
/// nullable keyword and uses the `x-nullable` extension.
pub fn make_nullable_schema(schema: Value, schema_type: SchemaType) -> Value {
    let Value::Object(mut obj) = schema else {
        return schema;
    };
    match schema_type {
        SchemaType::OpenApi3 => {
            if obj.contains_key("$ref") {
                return json!({ "nullable": true, "oneOf": [Value::Object(obj)] });
            }
            obj.insert("nullable".to_string(), json!(true));
        }
        SchemaType::Swagger2 => {
            obj.insert("x-nullable".to_string(), json!(true));
        }
    }
    Value::Object(obj)
}

/// Schema for an opaque binary payload.
pub fn binary_schema(schema_type: SchemaType) -> Value {
    match schema_type {
        SchemaType::Swagger2 => json!({ "type": "file" }),
        SchemaType::OpenApi3 => json!({ "type": "string", "format": "binary" }),
    }
}

/// Inline schema for a primitive.
pub fn primitive_schema(primitive: Primitive, schema_type: SchemaType) -> Value {
    match primitive {
        Primitive::String | Primitive::Char | Primitive::Xml => json!({ "type": "string" }),
        Primitive::Boolean => json!({ "type": "boolean" }),
        Primitive::Int32 | Primitive::Byte => json!({ "type": "integer", "format": "int32" }),
        Primitive::Int64 => json!({ "type": "integer", "format": "int64" }),
        Primitive::Float => json!({ "type": "number", "format": "float" }),
        Primitive::Double => json!({ "type": "number", "format": "double" }),
        Primitive::Decimal => json!({ "type": "number", "format": "decimal" }),
        Primitive::Uuid => json!({ "type": "string", "format": "uuid" }),
        Primitive::DateTime => json!({ "type": "string", "format": "date-time" }),
        Primitive::Date => json!({ "type": "string", "format": "date" }),
        Primitive::Duration => json!({ "type": "string", "format": "duration" }),
        Primitive::Uri => json!({ "type": "string", "format": "uri" }),
        Primitive::Any => json!({ "type": "object" }),
        Primitive::File | Primitive::Stream | Primitive::HttpResponse => binary_schema(schema_type),
        Primitive::Void => json!({}),
    }
}

/// Copies validation attributes onto an inline schema. References are left alone.
pub fn apply_validation(schema: &mut Value, attributes: &[Attribute]) {
    let Value::Object(obj) = schema else {
        return;
    };
    if obj.contains_key("$ref") {
        return;
    }
    for attr in attributes {
        match attr {
            Attribute::Range { minimum, maximum } => {
                if let Some(min) = minimum {
                    obj.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = maximum {
                    obj.insert("maximum".to_string(), json!(max));
                }
            }
            Attribute::StringLength { min, max } => {
                if let Some(min) = min {
                    obj.insert("minLength".to_string(), json!(min));
                }
                if let Some(max) = max {
                    obj.insert("maxLength".to_string(), json!(max));
                }
            }
            Attribute::Pattern { regex } => {
                obj.insert("pattern".to_string(), json!(regex));
            }
            _ => {}
        }
    }
}
