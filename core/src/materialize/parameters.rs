//! # Parameter Materializer
//!
//! Builds the documented parameters of one operation, either from the
//! action's own parameters and the framework conventions, or from the
//! bindings a host's native API explorer already decided.

use super::MaterializeContext;
use crate::descriptor::{
    ActionDescriptor, ApiDescription, Attribute, AttributeExt, BindingSource, Primitive,
    PropertyDef, TypeKind, TypeRef,
};
use crate::error::AppResult;
use crate::model::{CollectionFormat, Parameter, ParameterKind};
use crate::routing::template::{placeholders, remove_placeholder};
use crate::routing::NativePath;
use crate::schema::SchemaResolver;
use crate::settings::SchemaType;
use serde_json::{json, Value};

const MULTIPART: &str = "multipart/form-data";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Parameters of one operation plus what they imply for the route and media types.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedParameters {
    /// Parameters in declaration order.
    pub parameters: Vec<Parameter>,
    /// The path after removing placeholders of ignored parameters.
    pub path: String,
    /// Request media types implied by the parameters (files, forms, raw bodies).
    pub consumes: Option<Vec<String>>,
}

/// Everything needed to document one bound value.
struct ValueSource<'p> {
    name: &'p str,
    original_name: &'p str,
    ty: &'p TypeRef,
    attributes: &'p [Attribute],
    default: Option<&'p Value>,
    description: Option<String>,
    position: Option<usize>,
    host_required: bool,
}

/// Builds [`Parameter`]s.
pub struct ParameterMaterializer<'a> {
    ctx: MaterializeContext<'a>,
}

impl<'a> ParameterMaterializer<'a> {
    /// Creates a materializer.
    pub fn new(ctx: MaterializeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Parameters of an action served on `path`, bound by convention.
    pub fn from_action(
        &self,
        resolver: &mut dyn SchemaResolver,
        action: &ActionDescriptor,
        path: &str,
    ) -> AppResult<MaterializedParameters> {
        let mut path = path.to_string();
        let route_placeholders = placeholders(&path);
        let mut parameters = Vec::new();
        let mut consumes = None;

        for (index, param) in action.parameters.iter().enumerate() {
            if self.ctx.adapter.is_ignored(&param.attributes) {
                path = remove_placeholder(&path, &param.name);
                continue;
            }
            let binding =
                self.ctx
                    .adapter
                    .binding_source(param, &route_placeholders, self.ctx.catalog);
            let source = ValueSource {
                name: &binding.name,
                original_name: &param.name,
                ty: &param.ty,
                attributes: &param.attributes,
                default: param.default.as_ref(),
                description: parameter_doc(action, &param.name),
                position: Some(index + 1),
                host_required: false,
            };

            match binding.source {
                BindingSource::Special => {}
                BindingSource::Path => {
                    parameters.push(self.path_parameter(resolver, &source)?);
                }
                BindingSource::Query | BindingSource::Header | BindingSource::Form => {
                    let kind = kind_of(binding.source);
                    if let Some(properties) = self.flattenable(param.ty.non_nullable()) {
                        self.flatten(resolver, &source, kind, &properties, &mut parameters, &mut path)?;
                    } else {
                        parameters.push(self.value_parameter(resolver, &source, kind)?);
                    }
                }
                BindingSource::Body => {
                    let (parameter, media) = self.body_parameter(resolver, &source)?;
                    consumes = media.or(consumes);
                    parameters.push(parameter);
                }
            }
        }

        self.add_unbound_placeholders(&path, &mut parameters);
        Ok(self.finish(parameters, path, consumes))
    }

    /// Parameters of a natively described operation.
    pub fn from_api_description(
        &self,
        resolver: &mut dyn SchemaResolver,
        action: &ActionDescriptor,
        description: &ApiDescription,
        native: &NativePath,
    ) -> AppResult<MaterializedParameters> {
        let mut path = native.path.clone();
        let mut parameters = Vec::new();
        let mut consumes = None;

        for api_param in &description.parameters {
            let method_param = api_param
                .parameter
                .as_deref()
                .and_then(|n| action.parameters.iter().position(|p| p.name == n))
                .or_else(|| {
                    action
                        .parameters
                        .iter()
                        .position(|p| p.name.eq_ignore_ascii_case(&api_param.name))
                });
            let declared = method_param.map(|i| &action.parameters[i]);
            let property = match (api_param.property.as_deref(), declared) {
                (Some(prop), Some(param)) => self.property_of(param.ty.non_nullable(), prop),
                _ => None,
            };

            let attributes: &[Attribute] = match (property, declared) {
                (Some(prop), _) => &prop.attributes,
                (None, Some(param)) => &param.attributes,
                (None, None) => &[],
            };
            if self.ctx.adapter.is_ignored(attributes) {
                path = remove_placeholder(&path, &api_param.name);
                continue;
            }

            let fallback = TypeRef::primitive(Primitive::String);
            let ty = api_param
                .ty
                .as_ref()
                .or(property.map(|p| &p.ty))
                .or(declared.map(|p| &p.ty))
                .unwrap_or(&fallback);
            let original_name = property
                .map(|p| p.name.as_str())
                .or(declared.map(|p| p.name.as_str()))
                .unwrap_or(&api_param.name);
            let description_text = property
                .and_then(|p| p.description.clone())
                .or_else(|| parameter_doc(action, original_name));
            let source = ValueSource {
                name: &api_param.name,
                original_name,
                ty,
                attributes,
                default: api_param
                    .default
                    .as_ref()
                    .or(declared.and_then(|p| p.default.as_ref())),
                description: description_text,
                position: method_param.map(|i| i + 1),
                host_required: api_param.is_required,
            };

            match api_param.source {
                BindingSource::Special => {}
                BindingSource::Path => parameters.push(self.path_parameter(resolver, &source)?),
                BindingSource::Query | BindingSource::Header | BindingSource::Form => {
                    let kind = kind_of(api_param.source);
                    parameters.push(self.value_parameter(resolver, &source, kind)?);
                }
                BindingSource::Body => {
                    let (parameter, media) = self.body_parameter(resolver, &source)?;
                    consumes = media.or(consumes);
                    parameters.push(parameter);
                }
            }
        }

        for name in &native.unbound {
            parameters.push(synthetic_path_parameter(name));
        }
        Ok(self.finish(parameters, path, consumes))
    }

    fn finish(
        &self,
        mut parameters: Vec<Parameter>,
        path: String,
        consumes: Option<Vec<String>>,
    ) -> MaterializedParameters {
        assign_variable_names(&mut parameters);
        let forms: Vec<&Parameter> = parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::FormData)
            .collect();
        let consumes = if forms.iter().any(|p| p.is_file()) {
            Some(vec![MULTIPART.to_string()])
        } else if !forms.is_empty() && consumes.is_none() {
            Some(vec![FORM_URLENCODED.to_string()])
        } else {
            consumes
        };
        MaterializedParameters {
            parameters,
            path,
            consumes,
        }
    }

    fn path_parameter(
        &self,
        resolver: &mut dyn SchemaResolver,
        source: &ValueSource<'_>,
    ) -> AppResult<Parameter> {
        let ty = source.ty.non_nullable();
        let schema = if ty.is_simple(self.ctx.catalog) || ty.is_array() {
            resolver.generate(ty, source.attributes)?
        } else {
            json!({ "type": "string" })
        };
        let mut parameter = Parameter::new(source.name, ParameterKind::Path, schema);
        parameter.original_name = source.original_name.to_string();
        parameter.primitive_fallback = self.primitive_fallback(ty);
        parameter.is_required = true;
        parameter.is_nullable = is_nullable(source);
        parameter.description = source.description.clone();
        parameter.position = source.position;
        parameter.default = non_null(source.default);
        Ok(parameter)
    }

    /// Query, header or form value.
    fn value_parameter(
        &self,
        resolver: &mut dyn SchemaResolver,
        source: &ValueSource<'_>,
        kind: ParameterKind,
    ) -> AppResult<Parameter> {
        let ty = source.ty.non_nullable();
        let is_file = ty.is_file_like() || source.attributes.is_file_marker();
        let schema = if is_file {
            let binary = json!({ "type": "string", "format": "binary" });
            if ty.is_array() {
                json!({ "type": "array", "items": binary })
            } else {
                binary
            }
        } else {
            resolver.generate(ty, source.attributes)?
        };

        let kind = if is_file { ParameterKind::FormData } else { kind };
        let mut parameter = Parameter::new(source.name, kind, schema);
        parameter.original_name = source.original_name.to_string();
        parameter.primitive_fallback = if is_file {
            None
        } else {
            self.primitive_fallback(ty)
        };
        parameter.is_required = source.host_required || self.is_required(source);
        parameter.is_nullable = is_nullable(source);
        parameter.default = non_null(source.default);
        parameter.description = source.description.clone();
        parameter.position = source.position;
        if ty.is_array() {
            parameter.collection_format = Some(CollectionFormat::Multi);
        }
        Ok(parameter)
    }

    fn body_parameter(
        &self,
        resolver: &mut dyn SchemaResolver,
        source: &ValueSource<'_>,
    ) -> AppResult<(Parameter, Option<Vec<String>>)> {
        let ty = source.ty.non_nullable();
        let (schema, media) = match ty.as_primitive() {
            Some(Primitive::Xml) => (
                json!({ "type": "string" }),
                Some(vec!["application/xml".to_string()]),
            ),
            Some(Primitive::Stream | Primitive::File) => {
                let format = match self.ctx.settings.schema_type {
                    SchemaType::Swagger2 => "byte",
                    SchemaType::OpenApi3 => "binary",
                };
                (
                    json!({ "type": "string", "format": format }),
                    Some(vec!["application/octet-stream".to_string()]),
                )
            }
            _ => (resolver.generate(ty, source.attributes)?, None),
        };

        let mut parameter = Parameter::new(source.name, ParameterKind::Body, schema);
        parameter.original_name = source.original_name.to_string();
        parameter.is_required = true;
        parameter.is_nullable = is_nullable(source);
        parameter.description = source.description.clone();
        parameter.position = source.position;
        Ok((parameter, media))
    }

    /// Expands a complex query/header/form value into one parameter per property.
    fn flatten(
        &self,
        resolver: &mut dyn SchemaResolver,
        parent: &ValueSource<'_>,
        kind: ParameterKind,
        properties: &[&'a PropertyDef],
        out: &mut Vec<Parameter>,
        path: &mut String,
    ) -> AppResult<()> {
        for prop in properties {
            if prop.attributes.is_ignored() {
                *path = remove_placeholder(path, &prop.name);
                continue;
            }
            let (source_override, bound_name) = match prop.attributes.binding() {
                Some((source, name)) => (Some(source), name),
                None => (None, None),
            };
            let name = bound_name
                .or(prop.attributes.json_name())
                .unwrap_or(&prop.name);
            let source = ValueSource {
                name,
                original_name: &prop.name,
                ty: &prop.ty,
                attributes: &prop.attributes,
                default: None,
                description: prop.description.clone(),
                position: parent.position,
                host_required: false,
            };
            match source_override {
                Some(BindingSource::Special) => {}
                Some(BindingSource::Path) => out.push(self.path_parameter(resolver, &source)?),
                Some(BindingSource::Body) => {
                    let (parameter, _) = self.body_parameter(resolver, &source)?;
                    out.push(parameter);
                }
                Some(other) => out.push(self.value_parameter(resolver, &source, kind_of(other))?),
                None => out.push(self.value_parameter(resolver, &source, kind)?),
            }
        }
        Ok(())
    }

    /// Object properties when the type is a catalog object and flattening is on.
    fn flattenable(&self, ty: &TypeRef) -> Option<Vec<&'a PropertyDef>> {
        if !self.ctx.settings.flatten_complex_query_parameters {
            return None;
        }
        let TypeRef::Named(name) = ty else {
            return None;
        };
        let def = self.ctx.catalog.get(name)?;
        matches!(def.kind, TypeKind::Object { .. }).then(|| self.ctx.catalog.all_properties(name))
    }

    fn property_of(&self, ty: &TypeRef, property: &str) -> Option<&'a PropertyDef> {
        let TypeRef::Named(name) = ty else {
            return None;
        };
        self.ctx
            .catalog
            .all_properties(name)
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(property))
    }

    fn add_unbound_placeholders(&self, path: &str, parameters: &mut Vec<Parameter>) {
        for name in placeholders(path) {
            let bound = parameters
                .iter()
                .any(|p| p.kind == ParameterKind::Path && p.name.eq_ignore_ascii_case(&name));
            if !bound {
                parameters.push(synthetic_path_parameter(&name));
            }
        }
    }

    /// Primitive stand-in for enum schemas, for dialects that cannot reference
    /// a schema from a non-body parameter.
    fn primitive_fallback(&self, ty: &TypeRef) -> Option<Value> {
        let enum_schema = |ty: &TypeRef| -> Option<Value> {
            let TypeRef::Named(name) = ty.non_nullable() else {
                return None;
            };
            match &self.ctx.catalog.get(name)?.kind {
                TypeKind::Enum { as_string: true, .. } => Some(json!({ "type": "string" })),
                TypeKind::Enum { .. } => Some(json!({ "type": "integer", "format": "int32" })),
                TypeKind::Object { .. } => None,
            }
        };
        match ty.element_type() {
            Some(item) => enum_schema(item).map(|items| json!({ "type": "array", "items": items })),
            None => enum_schema(ty),
        }
    }

    fn is_required(&self, source: &ValueSource<'_>) -> bool {
        if source.attributes.is_required_marker() {
            return true;
        }
        if source.default.is_some() {
            return false;
        }
        self.ctx.settings.require_parameters_without_default
            || source.ty.is_value_type(self.ctx.catalog)
    }
}

fn kind_of(source: BindingSource) -> ParameterKind {
    match source {
        BindingSource::Path => ParameterKind::Path,
        BindingSource::Header => ParameterKind::Header,
        BindingSource::Body => ParameterKind::Body,
        BindingSource::Form => ParameterKind::FormData,
        BindingSource::Query | BindingSource::Special => ParameterKind::Query,
    }
}

fn is_nullable(source: &ValueSource<'_>) -> bool {
    source
        .attributes
        .nullability()
        .unwrap_or_else(|| source.ty.is_nullable() || matches!(source.default, Some(Value::Null)))
}

fn non_null(default: Option<&Value>) -> Option<Value> {
    default.filter(|v| !v.is_null()).cloned()
}

fn parameter_doc(action: &ActionDescriptor, name: &str) -> Option<String> {
    action
        .docs
        .as_ref()
        .and_then(|docs| docs.params.get(name))
        .cloned()
}

fn synthetic_path_parameter(name: &str) -> Parameter {
    let mut parameter = Parameter::new(name, ParameterKind::Path, json!({ "type": "string" }));
    parameter.is_required = true;
    parameter
}

/// Lower camel case with URL-unsafe characters treated as word breaks.
pub fn variable_name(name: &str) -> String {
    let words: Vec<&str> = name
        .split(|c: char| matches!(c, '-' | '.' | '$' | '@' | '[' | ']' | ' ' | '_'))
        .filter(|w| !w.is_empty())
        .collect();
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if i == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    if out.is_empty() {
        return "parameter".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Sets [`Parameter::variable_name`]; colliding names get the kind suffix.
fn assign_variable_names(parameters: &mut [Parameter]) {
    let bases: Vec<String> = parameters.iter().map(|p| variable_name(&p.name)).collect();
    for (i, parameter) in parameters.iter_mut().enumerate() {
        let collides = bases
            .iter()
            .enumerate()
            .any(|(j, base)| j != i && *base == bases[i]);
        parameter.variable_name = if collides {
            format!("{}{}", bases[i], parameter.kind.suffix())
        } else {
            bases[i].clone()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::WebApiAdapter;
    use crate::descriptor::{
        ApiParameterDescription, EnumValue, ParameterDescriptor, TypeCatalog, TypeDef,
    };
    use crate::schema::JsonSchemaGenerator;
    use crate::settings::GeneratorSettings;
    use crate::wrappers::WrapperRegistry;
    use pretty_assertions::assert_eq;

    fn catalog() -> TypeCatalog {
        let prop = |name: &str, ty: &str, attributes: Vec<Attribute>| PropertyDef {
            name: name.into(),
            ty: TypeRef::parse(ty).unwrap(),
            description: None,
            attributes,
        };
        TypeCatalog::new()
            .with_type(TypeDef {
                name: "MyParameter".into(),
                description: None,
                attributes: Vec::new(),
                kind: TypeKind::Object {
                    properties: vec![
                        prop("Foo", "string", vec![]),
                        prop(
                            "Bar",
                            "int32",
                            vec![Attribute::JsonProperty { name: "bar".into() }],
                        ),
                        prop("Tenant", "string", vec![Attribute::Bind {
                            source: BindingSource::Path,
                            name: None,
                        }]),
                        prop("Hidden", "string", vec![Attribute::Ignore]),
                    ],
                    base: None,
                    value_type: false,
                },
            })
            .with_type(TypeDef {
                name: "Person".into(),
                description: None,
                attributes: Vec::new(),
                kind: TypeKind::Object {
                    properties: vec![prop("Name", "string", vec![])],
                    base: None,
                    value_type: false,
                },
            })
            .with_type(TypeDef {
                name: "Color".into(),
                description: None,
                attributes: Vec::new(),
                kind: TypeKind::Enum {
                    values: vec![EnumValue {
                        name: "Red".into(),
                        value: 0,
                    }],
                    as_string: false,
                },
            })
    }

    fn materialize(
        settings: &GeneratorSettings,
        catalog: &TypeCatalog,
        action: &ActionDescriptor,
        path: &str,
    ) -> MaterializedParameters {
        let wrappers = WrapperRegistry::default();
        let ctx = MaterializeContext {
            settings,
            catalog,
            adapter: &WebApiAdapter,
            wrappers: &wrappers,
        };
        let mut resolver = JsonSchemaGenerator::new(catalog, settings.schema_type);
        ParameterMaterializer::new(ctx)
            .from_action(&mut resolver, action, path)
            .unwrap()
    }

    fn param(name: &str, ty: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(name, TypeRef::parse(ty).unwrap())
    }

    #[test]
    fn test_flattened_query_object() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Get").with_parameter(
            param("data", "MyParameter").with_attribute(Attribute::Bind {
                source: BindingSource::Query,
                name: None,
            }),
        );
        let result = materialize(&settings, &catalog, &action, "/api/{Tenant}/values");
        let names: Vec<(&str, ParameterKind)> = result
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Foo", ParameterKind::Query),
                ("bar", ParameterKind::Query),
                ("Tenant", ParameterKind::Path),
            ]
        );
        assert!(result.parameters[2].is_required);
        assert_eq!(result.parameters[1].original_name, "Bar");
    }

    #[test]
    fn test_path_parameters_are_required() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Get")
            .with_parameter(param("id", "int32?"))
            .with_parameter(param("color", "Color"));
        let result = materialize(&settings, &catalog, &action, "/items/{id}/{color}");
        assert!(result.parameters.iter().all(|p| p.is_required));
        assert_eq!(
            result.parameters[1].primitive_fallback,
            Some(json!({ "type": "integer", "format": "int32" }))
        );
        assert_eq!(
            result.parameters[1].schema,
            json!({ "$ref": "#/components/schemas/Color" })
        );
    }

    #[test]
    fn test_query_required_and_collection_format() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Search")
            .with_parameter(param("page", "int32"))
            .with_parameter(param("size", "int32").with_default(json!(20)))
            .with_parameter(param("filter", "string"))
            .with_parameter(param("ids", "Vec<int64>"))
            .with_parameter(param("name", "string").with_attribute(Attribute::Required));
        let result = materialize(&settings, &catalog, &action, "/search");
        let required: Vec<bool> = result.parameters.iter().map(|p| p.is_required).collect();
        assert_eq!(required, vec![true, false, false, false, true]);
        assert_eq!(result.parameters[1].default, Some(json!(20)));
        assert_eq!(
            result.parameters[3].collection_format,
            Some(CollectionFormat::Multi)
        );

        let strict = GeneratorSettings::default().with_require_parameters_without_default(true);
        let result = materialize(&strict, &catalog, &action, "/search");
        let required: Vec<bool> = result.parameters.iter().map(|p| p.is_required).collect();
        assert_eq!(required, vec![true, false, true, true, true]);
    }

    #[test]
    fn test_body_and_special_bodies() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Post").with_parameter(param("person", "Person?"));
        let result = materialize(&settings, &catalog, &action, "/persons");
        let body = &result.parameters[0];
        assert_eq!(body.kind, ParameterKind::Body);
        assert!(body.is_required);
        assert!(body.is_nullable);
        assert_eq!(result.consumes, None);

        let xml = ActionDescriptor::new("Post").with_parameter(
            param("doc", "xml").with_attribute(Attribute::Bind {
                source: BindingSource::Body,
                name: None,
            }),
        );
        let result = materialize(&settings, &catalog, &xml, "/xml");
        assert_eq!(result.consumes, Some(vec!["application/xml".to_string()]));
        assert_eq!(result.parameters[0].schema, json!({ "type": "string" }));
    }

    #[test]
    fn test_files_force_multipart() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Upload")
            .with_parameter(param("files", "files"))
            .with_parameter(param("title", "string").with_attribute(Attribute::Bind {
                source: BindingSource::Form,
                name: None,
            }));
        let result = materialize(&settings, &catalog, &action, "/upload");
        assert_eq!(result.consumes, Some(vec![MULTIPART.to_string()]));
        assert_eq!(result.parameters[0].kind, ParameterKind::FormData);
        assert!(result.parameters[0].is_file());
        assert_eq!(
            result.parameters[0].collection_format,
            Some(CollectionFormat::Multi)
        );
        assert_eq!(result.parameters[1].kind, ParameterKind::FormData);
    }

    #[test]
    fn test_ignored_parameter_removes_placeholder() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let action = ActionDescriptor::new("Get")
            .with_parameter(param("tenant", "string").with_attribute(Attribute::Ignore))
            .with_parameter(param("id", "int32"));
        let result = materialize(&settings, &catalog, &action, "/api/{tenant}/items/{id}");
        assert_eq!(result.path, "/api/items/{id}");
        assert_eq!(result.parameters.len(), 1);
    }

    #[test]
    fn test_variable_names() {
        assert_eq!(variable_name("X-Api-Key"), "xApiKey");
        assert_eq!(variable_name("$filter"), "filter");
        assert_eq!(variable_name("items[0]"), "items0");
        assert_eq!(variable_name("2fa"), "_2fa");

        let mut params = vec![
            Parameter::new("id", ParameterKind::Path, json!({})),
            Parameter::new("Id", ParameterKind::Query, json!({})),
            Parameter::new("name", ParameterKind::Query, json!({})),
        ];
        assign_variable_names(&mut params);
        let names: Vec<&str> = params.iter().map(|p| p.variable_name.as_str()).collect();
        assert_eq!(names, vec!["idPath", "idQuery", "name"]);
    }

    #[test]
    fn test_native_descriptions() {
        let settings = GeneratorSettings::default();
        let catalog = catalog();
        let wrappers = WrapperRegistry::default();
        let ctx = MaterializeContext {
            settings: &settings,
            catalog: &catalog,
            adapter: &WebApiAdapter,
            wrappers: &wrappers,
        };
        let mut resolver = JsonSchemaGenerator::new(&catalog, settings.schema_type);
        let action = ActionDescriptor::new("Get")
            .with_parameter(param("id", "int32"))
            .with_parameter(param("query", "MyParameter"));
        let description = ApiDescription {
            controller: "ValuesController".into(),
            action: "Get".into(),
            http_method: None,
            relative_path: "api/values/{id}".into(),
            group_name: None,
            parameters: vec![
                ApiParameterDescription {
                    name: "id".into(),
                    source: BindingSource::Path,
                    ty: None,
                    parameter: Some("id".into()),
                    property: None,
                    is_required: true,
                    default: None,
                },
                ApiParameterDescription {
                    name: "Foo".into(),
                    source: BindingSource::Query,
                    ty: None,
                    parameter: Some("query".into()),
                    property: Some("Foo".into()),
                    is_required: false,
                    default: None,
                },
            ],
            supported_response_types: Vec::new(),
        };
        let native = NativePath {
            path: "/api/values/{id}".into(),
            unbound: vec!["tenant".into()],
        };
        let result = ParameterMaterializer::new(ctx)
            .from_api_description(&mut resolver, &action, &description, &native)
            .unwrap();
        let names: Vec<(&str, ParameterKind, Option<usize>)> = result
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.kind, p.position))
            .collect();
        assert_eq!(
            names,
            vec![
                ("id", ParameterKind::Path, Some(1)),
                ("Foo", ParameterKind::Query, Some(2)),
                ("tenant", ParameterKind::Path, None),
            ]
        );
        assert_eq!(result.parameters[1].schema, json!({ "type": "string" }));
    }
}
