#![deny(missing_docs)]

//! # Generator Settings
//!
//! Serializable configuration for one generation run. Settings are validated
//! up front so configuration mistakes surface before any controller is read.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaType {
    /// Swagger 2.0 (`definitions`, `in: body`, `x-nullable`).
    #[serde(alias = "swagger2", alias = "swagger")]
    Swagger2,
    /// OpenAPI 3.0 (`components`, `requestBody`, `nullable`).
    #[default]
    #[serde(alias = "openapi3", alias = "openapi")]
    OpenApi3,
}

impl SchemaType {
    /// JSON pointer prefix for schema references.
    pub fn definitions_pointer(&self) -> &'static str {
        match self {
            SchemaType::Swagger2 => "#/definitions/",
            SchemaType::OpenApi3 => "#/components/schemas/",
        }
    }
}

/// How reference types are treated when nothing annotates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// Not nullable unless annotated.
    #[default]
    NotNull,
    /// Nullable unless annotated.
    Null,
}

/// Hosting framework whose routing and binding conventions apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framework {
    /// Classic Web API: `RoutePrefix`, `~/` absolute routes, `FromUri`.
    #[default]
    WebApi,
    /// ASP.NET Core: controller-level `Route`, `[controller]`/`[action]` tokens.
    AspNetCore,
}

/// Title, description and version of the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    /// The title of the API.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// The version of the API.
    pub version: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "My Title".into(),
            description: None,
            version: "1.0.0".into(),
        }
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Document info.
    pub info: DocumentInfo,
    /// Output dialect.
    pub schema_type: SchemaType,
    /// Routing and binding conventions.
    pub framework: Framework,
    /// Template used for actions without route attributes or prefix.
    pub default_url_template: String,
    /// Treat every parameter without a default value as required.
    pub require_parameters_without_default: bool,
    /// Only document these API groups (empty: all).
    pub api_group_names: Vec<String>,
    /// Literal JSON document the generated content is merged into.
    pub document_template: Option<String>,
    /// Prefer the declared route name as operation id.
    pub use_route_name_as_operation_id: bool,
    /// Keep placeholders whose parameter is not bound, as synthetic string parameters.
    pub keep_unbound_path_parameters: bool,
    /// Null handling for unannotated response payloads.
    pub default_response_null_handling: NullHandling,
    /// Media types consumed when nothing more specific applies.
    pub default_consumes: Vec<String>,
    /// Media types produced when nothing more specific applies.
    pub default_produces: Vec<String>,
    /// Lower-case the literal parts of paths from native API descriptions.
    pub lowercase_paths: bool,
    /// Expand complex query/form parameters into one parameter per property.
    pub flatten_complex_query_parameters: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            info: DocumentInfo::default(),
            schema_type: SchemaType::default(),
            framework: Framework::default(),
            default_url_template: "api/{controller}/{id?}".into(),
            require_parameters_without_default: false,
            api_group_names: Vec::new(),
            document_template: None,
            use_route_name_as_operation_id: false,
            keep_unbound_path_parameters: false,
            default_response_null_handling: NullHandling::default(),
            default_consumes: vec!["application/json".into()],
            default_produces: vec!["application/json".into()],
            lowercase_paths: false,
            flatten_complex_query_parameters: true,
        }
    }
}

impl GeneratorSettings {
    /// Creates settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output dialect.
    pub fn with_schema_type(mut self, schema_type: SchemaType) -> Self {
        self.schema_type = schema_type;
        self
    }

    /// Sets the hosting framework.
    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = framework;
        self
    }

    /// Sets the document title and version.
    pub fn with_info(mut self, title: impl Into<String>, version: impl Into<String>) -> Self {
        self.info.title = title.into();
        self.info.version = version.into();
        self
    }

    /// Sets the default URL template.
    pub fn with_default_url_template(mut self, template: impl Into<String>) -> Self {
        self.default_url_template = template.into();
        self
    }

    /// Sets the document template.
    pub fn with_document_template(mut self, template: impl Into<String>) -> Self {
        self.document_template = Some(template.into());
        self
    }

    /// Restricts the document to the given API groups.
    pub fn with_api_groups(mut self, groups: Vec<String>) -> Self {
        self.api_group_names = groups;
        self
    }

    /// Treat every parameter without default as required.
    pub fn with_require_parameters_without_default(mut self, value: bool) -> Self {
        self.require_parameters_without_default = value;
        self
    }

    /// Prefer route names as operation ids.
    pub fn with_route_name_operation_ids(mut self, value: bool) -> Self {
        self.use_route_name_as_operation_id = value;
        self
    }

    /// Keep unbound path placeholders.
    pub fn with_keep_unbound_path_parameters(mut self, value: bool) -> Self {
        self.keep_unbound_path_parameters = value;
        self
    }

    /// Sets the response null handling policy.
    pub fn with_response_null_handling(mut self, handling: NullHandling) -> Self {
        self.default_response_null_handling = handling;
        self
    }

    /// Fails fast on settings that cannot produce a document.
    pub fn validate(&self) -> AppResult<()> {
        if self.info.title.trim().is_empty() {
            return Err(AppError::Config("Document title must not be empty".into()));
        }
        if self.info.version.trim().is_empty() {
            return Err(AppError::Config("Document version must not be empty".into()));
        }
        validate_url_template(&self.default_url_template)?;
        if self.default_consumes.is_empty() || self.default_produces.is_empty() {
            return Err(AppError::Config(
                "Default consumes/produces media types must not be empty".into(),
            ));
        }
        self.parsed_document_template()?;
        Ok(())
    }

    /// The document template parsed as a JSON object.
    pub fn parsed_document_template(&self) -> AppResult<Option<serde_json::Map<String, Value>>> {
        let Some(raw) = self.document_template.as_deref() else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(AppError::Config(
                "Document template must be a JSON object".into(),
            )),
            Err(e) => Err(AppError::Config(format!(
                "Document template is not valid JSON: {}",
                e
            ))),
        }
    }
}

fn validate_url_template(template: &str) -> AppResult<()> {
    if template.trim().is_empty() {
        return Err(AppError::Config(
            "Default URL template must not be empty".into(),
        ));
    }
    let mut depth = 0i32;
    for ch in template.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if !(0..=1).contains(&depth) {
            return Err(AppError::Config(format!(
                "Default URL template '{}' has unbalanced braces",
                template
            )));
        }
    }
    if depth != 0 {
        return Err(AppError::Config(format!(
            "Default URL template '{}' has unbalanced braces",
            template
        )));
    }
    if template.contains("{}") {
        return Err(AppError::Config(format!(
            "Default URL template '{}' contains an empty placeholder",
            template
        )));
    }
    Ok(())
}
