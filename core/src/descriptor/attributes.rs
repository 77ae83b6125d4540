//! # Attributes
//!
//! Typed attribute model for controllers, actions, parameters and properties.
//! Every attribute the pipeline understands is a variant here, so adapters
//! never need to look attributes up by name.

use crate::descriptor::types::TypeRef;
use crate::descriptor::{BindingSource, HttpMethod};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The key of a declared response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStatus", into = "RawStatus")]
pub enum ResponseStatus {
    /// A concrete HTTP status code.
    Code(u16),
    /// The catch-all `default` response.
    Default,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStatus::Code(code) => write!(f, "{}", code),
            ResponseStatus::Default => write!(f, "default"),
        }
    }
}

impl ResponseStatus {
    /// Whether the status is a 2xx code.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Code(code) if (200..300).contains(code))
    }

    /// Canonical reason phrase, empty when unknown or for `default`.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            ResponseStatus::Code(code) => http::StatusCode::from_u16(*code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or(""),
            ResponseStatus::Default => "",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(u16),
    Text(String),
}

impl TryFrom<RawStatus> for ResponseStatus {
    type Error = String;

    fn try_from(value: RawStatus) -> Result<Self, Self::Error> {
        match value {
            RawStatus::Code(code) => Ok(ResponseStatus::Code(code)),
            RawStatus::Text(text) if text.eq_ignore_ascii_case("default") => {
                Ok(ResponseStatus::Default)
            }
            RawStatus::Text(text) => text
                .parse::<u16>()
                .map(ResponseStatus::Code)
                .map_err(|_| format!("Invalid response status '{}'", text)),
        }
    }
}

impl From<ResponseStatus> for RawStatus {
    fn from(value: ResponseStatus) -> Self {
        match value {
            ResponseStatus::Code(code) => RawStatus::Code(code),
            ResponseStatus::Default => RawStatus::Text("default".into()),
        }
    }
}

/// An attribute declared on a controller, action, parameter, property or type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// Route template on an action (or, for attribute-routed hosts, on a controller).
    Route {
        /// Template text; a leading `~/` ignores the controller prefix.
        template: String,
        /// Route name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Route prefix on a controller.
    RoutePrefix {
        /// Prefix text.
        prefix: String,
    },
    /// Single-verb attribute (`HttpGet`, `HttpPost`, ...), optionally with a template.
    HttpMethod {
        /// The verb.
        method: HttpMethod,
        /// Route template carried by the verb attribute.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<String>,
        /// Route name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Multi-verb attribute.
    AcceptVerbs {
        /// All accepted verbs.
        methods: Vec<HttpMethod>,
    },
    /// Marks a public method that is not an action.
    NonAction,
    /// Explicit binding source.
    Bind {
        /// Where the value comes from.
        source: BindingSource,
        /// Binding name override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Explicit file marker.
    File,
    /// Marks a parameter or property as required.
    Required,
    /// Excludes the member (or the whole action) from the document.
    Ignore,
    /// Serialized name override.
    JsonProperty {
        /// The serialized name.
        name: String,
    },
    /// Declares one response.
    ResponseType {
        /// Status code or `default`.
        status: ResponseStatus,
        /// Response payload type; `None` means no body.
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<TypeRef>,
        /// Response description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        /// Explicit nullability of the payload.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nullable: Option<bool>,
    },
    /// Explicit operation id.
    OperationId {
        /// The id.
        id: String,
    },
    /// Marks an action or controller as deprecated.
    Obsolete,
    /// Explicit operation tags.
    Tags {
        /// Tag names.
        tags: Vec<String>,
    },
    /// Document-level tag description, declared on a controller.
    TagDescription {
        /// Tag name.
        name: String,
        /// Description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// Operation summary.
    Summary {
        /// Text.
        text: String,
    },
    /// Operation description.
    Description {
        /// Text.
        text: String,
    },
    /// Operation-level specification extension.
    ExtensionData {
        /// Key (`x-` is prefixed when missing).
        key: String,
        /// Value.
        value: Value,
    },
    /// Document-level specification extension, declared on a controller.
    DocumentExtensionData {
        /// Key (`x-` is prefixed when missing).
        key: String,
        /// Value.
        value: Value,
    },
    /// Request media types.
    Consumes {
        /// Media types.
        media_types: Vec<String>,
    },
    /// Response media types.
    Produces {
        /// Media types.
        media_types: Vec<String>,
    },
    /// API explorer group.
    ApiGroup {
        /// Group name.
        name: String,
    },
    /// Declares an additional operation processor by registered name.
    OperationProcessor {
        /// Registered processor name.
        name: String,
        /// Constructor arguments.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<Value>,
    },
    /// Numeric range validation.
    Range {
        /// Inclusive minimum.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        /// Inclusive maximum.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    /// String length validation.
    StringLength {
        /// Minimum length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<u64>,
        /// Maximum length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
    /// Regular expression validation.
    Pattern {
        /// The expression.
        regex: String,
    },
    /// Nullability annotation: never null.
    NotNull,
    /// Nullability annotation: may be null.
    CanBeNull,
}

/// Typed lookups over an attribute list.
pub trait AttributeExt {
    /// Whether the member is excluded.
    fn is_ignored(&self) -> bool;
    /// Whether a required marker is present.
    fn is_required_marker(&self) -> bool;
    /// Whether an explicit file marker is present.
    fn is_file_marker(&self) -> bool;
    /// Whether the member is marked obsolete.
    fn is_obsolete(&self) -> bool;
    /// The explicit binding source and name override, if any.
    fn binding(&self) -> Option<(BindingSource, Option<&str>)>;
    /// Serialized name override.
    fn json_name(&self) -> Option<&str>;
    /// Nullability annotation (`Some(true)` for may-be-null).
    fn nullability(&self) -> Option<bool>;
}

impl AttributeExt for [Attribute] {
    fn is_ignored(&self) -> bool {
        self.iter().any(|a| matches!(a, Attribute::Ignore))
    }

    fn is_required_marker(&self) -> bool {
        self.iter().any(|a| matches!(a, Attribute::Required))
    }

    fn is_file_marker(&self) -> bool {
        self.iter().any(|a| matches!(a, Attribute::File))
    }

    fn is_obsolete(&self) -> bool {
        self.iter().any(|a| matches!(a, Attribute::Obsolete))
    }

    fn binding(&self) -> Option<(BindingSource, Option<&str>)> {
        self.iter().find_map(|a| match a {
            Attribute::Bind { source, name } => Some((*source, name.as_deref())),
            _ => None,
        })
    }

    fn json_name(&self) -> Option<&str> {
        self.iter().find_map(|a| match a {
            Attribute::JsonProperty { name } => Some(name.as_str()),
            _ => None,
        })
    }

    fn nullability(&self) -> Option<bool> {
        self.iter().find_map(|a| match a {
            Attribute::NotNull => Some(false),
            Attribute::CanBeNull => Some(true),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_attributes() {
        let yaml = r#"
- kind: route_prefix
  prefix: api/Persons
- kind: http_method
  method: get
  template: "{id}"
- kind: response_type
  status: 409
  type: string
- kind: response_type
  status: default
- kind: bind
  source: query
- kind: non_action
"#;
        let attrs: Vec<Attribute> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(attrs.len(), 6);
        assert!(matches!(
            &attrs[2],
            Attribute::ResponseType { status: ResponseStatus::Code(409), ty: Some(_), .. }
        ));
        assert!(matches!(
            &attrs[3],
            Attribute::ResponseType { status: ResponseStatus::Default, ty: None, .. }
        ));
        assert_eq!(attrs.binding(), Some((BindingSource::Query, None)));
    }

    #[test]
    fn test_status_from_text() {
        let status: ResponseStatus = serde_json::from_str("\"404\"").unwrap();
        assert_eq!(status, ResponseStatus::Code(404));
        assert!(serde_json::from_str::<ResponseStatus>("\"teapot\"").is_err());
        assert_eq!(ResponseStatus::Code(409).reason_phrase(), "Conflict");
        assert!(ResponseStatus::Code(204).is_success());
        assert!(!ResponseStatus::Default.is_success());
    }

    #[test]
    fn test_lookups() {
        let attrs = vec![
            Attribute::Required,
            Attribute::JsonProperty { name: "bar".into() },
            Attribute::CanBeNull,
        ];
        assert!(attrs.is_required_marker());
        assert_eq!(attrs.json_name(), Some("bar"));
        assert_eq!(attrs.nullability(), Some(true));
        assert!(!attrs.is_ignored());
    }
}
