#![deny(missing_docs)]

//! # Reflection Snapshot
//!
//! The input side of the pipeline: controllers, actions, parameters, named
//! types and (for hosts with a native API explorer) per-request API
//! descriptions. Everything is serde-loadable so a snapshot can be produced
//! by any host and fed to the generator as YAML or JSON.

pub mod attributes;
pub mod catalog;
pub mod types;

pub use attributes::{Attribute, AttributeExt, ResponseStatus};
pub use catalog::{EnumValue, PropertyDef, TypeCatalog, TypeDef, TypeKind};
pub use types::{Primitive, TypeRef};

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// HTTP methods an operation can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    #[serde(alias = "GET", alias = "Get")]
    Get,
    /// POST
    #[serde(alias = "POST", alias = "Post")]
    Post,
    /// PUT
    #[serde(alias = "PUT", alias = "Put")]
    Put,
    /// DELETE
    #[serde(alias = "DELETE", alias = "Delete")]
    Delete,
    /// PATCH
    #[serde(alias = "PATCH", alias = "Patch")]
    Patch,
    /// HEAD
    #[serde(alias = "HEAD", alias = "Head")]
    Head,
    /// OPTIONS
    #[serde(alias = "OPTIONS", alias = "Options")]
    Options,
}

impl HttpMethod {
    /// All methods, in the order they are tried when inferring from action names.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Lower-case name as used for path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    /// Case-insensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an HTTP request supplies a parameter's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    /// Path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
    /// Form field (including files).
    Form,
    /// Supplied by the host (services, cancellation tokens); never documented.
    Special,
}

/// XML-documentation style comments attached to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer remarks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Description of the return value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Per-parameter descriptions.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
}

/// A reflected method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Declared name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default value. `Some(Value::Null)` is a declared `null` default.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Declared attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl ParameterDescriptor {
    /// Creates a parameter without default or attributes.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// A reflected action method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Method name.
    pub name: String,
    /// Declared parameters in order.
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Declared return type.
    #[serde(rename = "returns", default = "TypeRef::void")]
    pub return_type: TypeRef,
    /// Nullability annotation on the return value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_nullable: Option<bool>,
    /// Declared attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Documentation comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

impl ActionDescriptor {
    /// Creates an action returning `void`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeRef::void(),
            return_nullable: None,
            attributes: Vec::new(),
            docs: None,
        }
    }

    /// Adds a parameter.
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the return type.
    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// A reflected controller type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerDescriptor {
    /// Type name, e.g. `PersonsController`.
    pub name: String,
    /// Base controller type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Abstract controllers only contribute inherited actions.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Declared attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Actions declared on this type (not inherited ones).
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
}

impl ControllerDescriptor {
    /// Creates a controller without actions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            is_abstract: false,
            attributes: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }

    /// Sets the base controller.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Controller name without the `Controller` suffix.
    pub fn short_name(&self) -> &str {
        let name = self.name.rsplit('.').next().unwrap_or(&self.name);
        match name.strip_suffix("Controller") {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => name,
        }
    }
}

/// A parameter as described by a host's native API explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiParameterDescription {
    /// Bound name.
    pub name: String,
    /// Binding source chosen by the host.
    pub source: BindingSource,
    /// Bound type; falls back to the method parameter type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    /// Name of the method parameter this value is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Name of the container property when a complex parameter was expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Host-determined required flag.
    #[serde(default)]
    pub is_required: bool,
    /// Default value.
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

/// A response type as described by a host's native API explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponseType {
    /// Status code.
    pub status_code: u16,
    /// Whether the host marked this entry as the catch-all default.
    #[serde(default)]
    pub is_default_response: bool,
    /// Payload type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
}

/// One (path, method) pair as described by a host's native API explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDescription {
    /// Controller type name (must exist in the snapshot's controllers).
    pub controller: String,
    /// Action method name.
    pub action: String,
    /// HTTP method; inferred from the action when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<HttpMethod>,
    /// Route text relative to the application root.
    pub relative_path: String,
    /// API explorer group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// Bound parameters.
    #[serde(default)]
    pub parameters: Vec<ApiParameterDescription>,
    /// Supported response types.
    #[serde(default)]
    pub supported_response_types: Vec<ApiResponseType>,
}

/// Everything the generator consumes from a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionSnapshot {
    /// Named types.
    #[serde(default)]
    pub types: TypeCatalog,
    /// Controllers in enumeration order.
    #[serde(default)]
    pub controllers: Vec<ControllerDescriptor>,
    /// Native API descriptions, when the host provides them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_descriptions: Vec<ApiDescription>,
}

impl ReflectionSnapshot {
    /// Parses a snapshot from YAML (JSON is accepted as well, being a YAML subset).
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parses a snapshot from JSON.
    pub fn from_json(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads a snapshot file; the extension picks the format.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Whether the host supplied native API descriptions.
    pub fn has_api_descriptions(&self) -> bool {
        !self.api_descriptions.is_empty()
    }

    /// Looks up a controller by type name.
    pub fn controller(&self, name: &str) -> Option<&ControllerDescriptor> {
        self.controllers.iter().find(|c| c.name == name)
    }

    /// The controller followed by its base types, most-derived first.
    ///
    /// Fails when a base is missing or the chain is cyclic.
    pub fn inheritance_chain<'a>(
        &'a self,
        controller: &'a ControllerDescriptor,
    ) -> AppResult<Vec<&'a ControllerDescriptor>> {
        let mut chain = vec![controller];
        let mut current = controller;
        while let Some(base) = current.base.as_deref() {
            let next = self.controller(base).ok_or_else(|| {
                AppError::Reflection(format!(
                    "Base controller '{}' of '{}' is not part of the snapshot",
                    base, current.name
                ))
            })?;
            if chain.iter().any(|c| c.name == next.name) {
                return Err(AppError::Reflection(format!(
                    "Cyclic controller inheritance at '{}'",
                    next.name
                )));
            }
            chain.push(next);
            current = next;
        }
        Ok(chain)
    }
}

fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_lookup() {
        assert_eq!(HttpMethod::from_name("POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::from_name("Get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_name("trace"), None);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ControllerDescriptor::new("PersonsController").short_name(), "Persons");
        assert_eq!(ControllerDescriptor::new("Api.Home").short_name(), "Home");
        assert_eq!(ControllerDescriptor::new("Controller").short_name(), "Controller");
    }

    #[test]
    fn test_null_default_is_kept() {
        let yaml = r#"
name: filter
type: string
default: null
"#;
        let param: ParameterDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(param.default, Some(Value::Null));

        let without: ParameterDescriptor = serde_yaml::from_str("name: a\ntype: int32\n").unwrap();
        assert_eq!(without.default, None);
    }

    #[test]
    fn test_snapshot_from_yaml() {
        let yaml = r#"
types:
  - name: Person
    kind: object
    properties:
      - name: Name
        type: string
controllers:
  - name: PersonsController
    attributes:
      - kind: route_prefix
        prefix: api/Persons
    actions:
      - name: Get
        returns: Vec<Person>
      - name: Delete
        parameters:
          - name: id
            type: int32
"#;
        let snapshot = ReflectionSnapshot::from_yaml(yaml).unwrap();
        assert_eq!(snapshot.controllers.len(), 1);
        let actions = &snapshot.controllers[0].actions;
        assert!(actions[0].return_type.is_array());
        assert!(actions[1].return_type.is_void());
        assert!(!snapshot.has_api_descriptions());
    }

    #[test]
    fn test_inheritance_chain_detects_missing_base() {
        let snapshot = ReflectionSnapshot {
            controllers: vec![ControllerDescriptor::new("A").with_base("Missing")],
            ..Default::default()
        };
        let err = snapshot
            .inheritance_chain(&snapshot.controllers[0])
            .unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }
}
