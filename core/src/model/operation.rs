//! # Operations
//!
//! Path items, operations, parameters and responses of a generated document.

use crate::descriptor::HttpMethod;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Where a documented parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request body (at most one per operation).
    Body,
    /// Form field.
    FormData,
}

impl ParameterKind {
    /// The `in` value used by both dialects for non-body parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Path => "path",
            ParameterKind::Query => "query",
            ParameterKind::Header => "header",
            ParameterKind::Body => "body",
            ParameterKind::FormData => "formData",
        }
    }

    /// Suffix used to disambiguate generated variable names.
    pub fn suffix(&self) -> &'static str {
        match self {
            ParameterKind::Path => "Path",
            ParameterKind::Query => "Query",
            ParameterKind::Header => "Header",
            ParameterKind::Body => "Body",
            ParameterKind::FormData => "FormData",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Array serialization of a non-body parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionFormat {
    /// Comma separated values.
    Csv,
    /// Repeated parameter (`?a=1&a=2`).
    Multi,
}

impl CollectionFormat {
    /// Swagger 2.0 spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionFormat::Csv => "csv",
            CollectionFormat::Multi => "multi",
        }
    }
}

/// A documented request parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name on the wire.
    pub name: String,
    /// Reflected member name before any binding rename.
    pub original_name: String,
    /// Identifier-safe, lower camel case name unique within the operation.
    pub variable_name: String,
    /// Location.
    pub kind: ParameterKind,
    /// Schema of the value, not yet wrapped for nullability.
    pub schema: Value,
    /// Primitive schema used where the dialect cannot reference a schema (Swagger 2.0 non-body).
    pub primitive_fallback: Option<Value>,
    /// Required flag.
    pub is_required: bool,
    /// Nullable flag.
    pub is_nullable: bool,
    /// Default value.
    pub default: Option<Value>,
    /// Array serialization.
    pub collection_format: Option<CollectionFormat>,
    /// Description.
    pub description: Option<String>,
    /// 1-based position of the originating method parameter.
    pub position: Option<usize>,
}

impl Parameter {
    /// Creates a parameter with the given wire name, location and schema.
    pub fn new(name: impl Into<String>, kind: ParameterKind, schema: Value) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            variable_name: name.clone(),
            name,
            kind,
            schema,
            primitive_fallback: None,
            is_required: false,
            is_nullable: false,
            default: None,
            collection_format: None,
            description: None,
            position: None,
        }
    }

    /// Whether the schema is a binary file.
    pub fn is_file(&self) -> bool {
        is_binary_schema(&self.schema)
            || self
                .schema
                .get("items")
                .is_some_and(is_binary_schema)
    }
}

fn is_binary_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("file")
        || (schema.get("type").and_then(Value::as_str) == Some("string")
            && schema.get("format").and_then(Value::as_str) == Some("binary"))
}

/// A documented response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Payload schema; `None` means no body.
    pub schema: Option<Value>,
    /// Whether the payload may be null.
    pub is_nullable: bool,
    /// Description (required by both dialects).
    pub description: String,
}

/// One HTTP method on one path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Operation {
    /// Document-wide unique id.
    pub operation_id: String,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// Responses keyed by status code or `default`.
    pub responses: IndexMap<String, Response>,
    /// Deprecated flag.
    pub is_deprecated: bool,
    /// Request media types; `None` when identical to the document-level list.
    pub consumes: Option<Vec<String>>,
    /// Response media types; `None` when identical to the document-level list.
    pub produces: Option<Vec<String>>,
    /// Specification extensions.
    pub extension_data: IndexMap<String, Value>,
}

impl Operation {
    /// The body parameter, if any.
    pub fn body_parameter(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.kind == ParameterKind::Body)
    }

    /// Number of body parameters.
    pub fn body_parameter_count(&self) -> usize {
        self.parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::Body)
            .count()
    }

    /// Enforces the single body parameter invariant.
    pub fn ensure_single_body(&self) -> AppResult<()> {
        if self.body_parameter_count() > 1 {
            return Err(AppError::MultipleBodyParameters {
                operation_id: self.operation_id.clone(),
            });
        }
        Ok(())
    }

    /// Whether any parameter is a file.
    pub fn has_file_parameter(&self) -> bool {
        self.parameters
            .iter()
            .any(|p| p.kind == ParameterKind::FormData && p.is_file())
    }
}

/// The operations registered on one path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathItem {
    operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// Registers an operation; a second registration of the same method fails.
    pub fn insert(&mut self, path: &str, method: HttpMethod, operation: Operation) -> AppResult<()> {
        if self.operations.contains_key(&method) {
            return Err(AppError::DuplicateOperation {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
        self.operations.insert(method, operation);
        Ok(())
    }

    /// Looks up the operation for a method.
    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Whether a method is registered.
    pub fn contains(&self, method: HttpMethod) -> bool {
        self.operations.contains_key(&method)
    }

    /// Iterates operations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        self.operations.iter().map(|(m, o)| (*m, o))
    }

    /// Iterates operations mutably in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (HttpMethod, &mut Operation)> {
        self.operations.iter_mut().map(|(m, o)| (*m, o))
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation is registered.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_method_is_rejected() {
        let mut item = PathItem::default();
        item.insert("/a", HttpMethod::Get, Operation::default()).unwrap();
        let err = item
            .insert("/a", HttpMethod::Get, Operation::default())
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateOperation { .. }));
        assert!(item.insert("/a", HttpMethod::Post, Operation::default()).is_ok());
        assert_eq!(item.len(), 2);
    }

    #[test]
    fn test_single_body_invariant() {
        let mut op = Operation {
            operation_id: "Things_Put".into(),
            ..Default::default()
        };
        op.parameters
            .push(Parameter::new("a", ParameterKind::Body, json!({})));
        assert!(op.ensure_single_body().is_ok());
        op.parameters
            .push(Parameter::new("b", ParameterKind::Body, json!({})));
        let err = op.ensure_single_body().unwrap_err();
        assert!(err.to_string().contains("Things_Put"));
    }

    #[test]
    fn test_file_parameter_detection() {
        let single = Parameter::new(
            "file",
            ParameterKind::FormData,
            json!({ "type": "string", "format": "binary" }),
        );
        let many = Parameter::new(
            "files",
            ParameterKind::FormData,
            json!({ "type": "array", "items": { "type": "file" } }),
        );
        let text = Parameter::new("title", ParameterKind::FormData, json!({ "type": "string" }));
        assert!(single.is_file());
        assert!(many.is_file());
        assert!(!text.is_file());
    }
}
