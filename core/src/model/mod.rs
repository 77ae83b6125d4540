#![deny(missing_docs)]

//! # Document Model
//!
//! The generated document. It is created once per generation run, mutated by
//! the generator and its processors, and serialized at the end.

pub mod operation;
mod serialize;

pub use operation::{
    CollectionFormat, Operation, Parameter, ParameterKind, PathItem, Response,
};

use crate::descriptor::HttpMethod;
use crate::error::AppResult;
use crate::settings::{DocumentInfo, SchemaType};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A document-level tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Tag description.
    pub description: Option<String>,
}

/// The root of a generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Title, description and version.
    pub info: DocumentInfo,
    /// Output dialect.
    pub schema_type: SchemaType,
    /// Path table in insertion order.
    pub paths: IndexMap<String, PathItem>,
    /// Media types every operation consumes.
    pub consumes: Vec<String>,
    /// Media types every operation produces.
    pub produces: Vec<String>,
    /// Tags.
    pub tags: Vec<Tag>,
    /// Named schema definitions.
    pub definitions: IndexMap<String, Value>,
    /// Specification extensions and template keys passed through verbatim.
    pub extension_data: IndexMap<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new(info: DocumentInfo, schema_type: SchemaType) -> Self {
        Self {
            info,
            schema_type,
            paths: IndexMap::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            tags: Vec::new(),
            definitions: IndexMap::new(),
            extension_data: IndexMap::new(),
        }
    }

    /// Creates a document seeded from a template object.
    ///
    /// `info` and `tags` are read from the template; other keys that the
    /// generator does not own are passed through unchanged.
    pub fn from_template(
        template: Map<String, Value>,
        fallback_info: DocumentInfo,
        schema_type: SchemaType,
    ) -> Self {
        let mut doc = Document::new(fallback_info, schema_type);
        for (key, value) in template {
            match key.as_str() {
                "swagger" | "openapi" | "paths" | "consumes" | "produces" => {}
                "info" => {
                    if let Some(title) = value.get("title").and_then(Value::as_str) {
                        doc.info.title = title.to_string();
                    }
                    if let Some(version) = value.get("version").and_then(Value::as_str) {
                        doc.info.version = version.to_string();
                    }
                    if let Some(desc) = value.get("description").and_then(Value::as_str) {
                        doc.info.description = Some(desc.to_string());
                    }
                }
                "tags" => {
                    let tags = value.as_array().map(Vec::as_slice).unwrap_or_default();
                    for tag in tags {
                        if let Some(name) = tag.get("name").and_then(Value::as_str) {
                            doc.tags.push(Tag {
                                name: name.to_string(),
                                description: tag
                                    .get("description")
                                    .and_then(Value::as_str)
                                    .map(str::to_string),
                            });
                        }
                    }
                }
                "definitions" => {
                    if let Value::Object(defs) = value {
                        doc.definitions.extend(defs);
                    }
                }
                "components" => {
                    let Value::Object(mut components) = value else {
                        continue;
                    };
                    if let Some(Value::Object(schemas)) = components.remove("schemas") {
                        doc.definitions.extend(schemas);
                    }
                    if !components.is_empty() {
                        doc.extension_data
                            .insert("components".into(), Value::Object(components));
                    }
                }
                _ => {
                    doc.extension_data.insert(key, value);
                }
            }
        }
        doc
    }

    /// Registers an operation; the same method twice on one path fails.
    pub fn add_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        operation: Operation,
    ) -> AppResult<()> {
        self.paths
            .entry(path.to_string())
            .or_default()
            .insert(path, method, operation)
    }

    /// Whether the path/method pair is registered.
    pub fn contains_operation(&self, path: &str, method: HttpMethod) -> bool {
        self.paths.get(path).is_some_and(|item| item.contains(method))
    }

    /// Looks up an operation.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Iterates `(path, method, operation)` in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths
            .iter()
            .flat_map(|(path, item)| item.iter().map(move |(m, o)| (path.as_str(), m, o)))
    }

    /// Iterates operations mutably in document order.
    pub fn operations_mut(&mut self) -> impl Iterator<Item = (&str, HttpMethod, &mut Operation)> {
        self.paths
            .iter_mut()
            .flat_map(|(path, item)| item.iter_mut().map(move |(m, o)| (path.as_str(), m, o)))
    }

    /// Whether any operation already uses the id.
    pub fn has_operation_id(&self, id: &str) -> bool {
        self.operations().any(|(_, _, op)| op.operation_id == id)
    }

    /// Returns `id`, or `id_2`, `id_3`, ... whichever is not taken yet.
    pub fn unique_operation_id(&self, id: &str) -> String {
        if !self.has_operation_id(id) {
            return id.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", id, n))
            .find(|candidate| !self.has_operation_id(candidate))
            .unwrap_or_else(|| id.to_string())
    }

    /// Adds a tag unless one with the same name exists; a missing description is filled in.
    pub fn add_tag(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|t| t.name == tag.name) {
            Some(existing) => {
                if existing.description.is_none() {
                    existing.description = tag.description;
                }
            }
            None => self.tags.push(tag),
        }
    }

    /// Serializes to pretty JSON text.
    pub fn to_json_string(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    /// Serializes to YAML text.
    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(&self.to_json())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(id: &str) -> Operation {
        Operation {
            operation_id: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unique_operation_id_suffixes() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::OpenApi3);
        assert_eq!(doc.unique_operation_id("Persons_Get"), "Persons_Get");
        doc.add_operation("/a", HttpMethod::Get, op("Persons_Get")).unwrap();
        assert_eq!(doc.unique_operation_id("Persons_Get"), "Persons_Get_2");
        doc.add_operation("/b", HttpMethod::Get, op("Persons_Get_2")).unwrap();
        assert_eq!(doc.unique_operation_id("Persons_Get"), "Persons_Get_3");
    }

    #[test]
    fn test_operations_iterate_in_order() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::OpenApi3);
        doc.add_operation("/a", HttpMethod::Post, op("1")).unwrap();
        doc.add_operation("/b", HttpMethod::Get, op("2")).unwrap();
        doc.add_operation("/a", HttpMethod::Get, op("3")).unwrap();
        let ids: Vec<_> = doc.operations().map(|(_, _, o)| o.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
        assert!(doc.contains_operation("/a", HttpMethod::Get));
    }

    #[test]
    fn test_from_template() {
        let template = json!({
            "swagger": "2.0",
            "info": { "title": "From Template", "version": "2.0.0" },
            "host": "example.org",
            "tags": [{ "name": "Persons", "description": "People" }],
            "components": { "securitySchemes": { "key": { "type": "apiKey" } } }
        });
        let Value::Object(map) = template else {
            panic!("object expected");
        };
        let doc = Document::from_template(map, DocumentInfo::default(), SchemaType::OpenApi3);
        assert_eq!(doc.info.title, "From Template");
        assert_eq!(doc.info.version, "2.0.0");
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.extension_data.get("host"), Some(&json!("example.org")));
        assert!(doc.extension_data.contains_key("components"));
    }

    #[test]
    fn test_add_tag_fills_description() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::OpenApi3);
        doc.add_tag(Tag { name: "A".into(), description: None });
        doc.add_tag(Tag { name: "A".into(), description: Some("desc".into()) });
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.tags[0].description.as_deref(), Some("desc"));
    }
}
