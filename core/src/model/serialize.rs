//! Dialect-specific JSON rendering of a [`Document`].

use super::{Document, Operation, Parameter, ParameterKind, PathItem, Response, Tag};
use crate::schema::make_nullable_schema;
use crate::settings::SchemaType;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const OCTET_STREAM: &str = "application/octet-stream";

impl Document {
    /// Renders the document as Swagger 2.0 or OpenAPI 3.0 JSON, per `schema_type`.
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        match self.schema_type {
            SchemaType::Swagger2 => doc.insert("swagger".to_string(), json!("2.0")),
            SchemaType::OpenApi3 => doc.insert("openapi".to_string(), json!("3.0.0")),
        };

        let mut info_obj = Map::new();
        info_obj.insert("title".to_string(), json!(self.info.title));
        if let Some(desc) = &self.info.description {
            info_obj.insert("description".to_string(), json!(desc));
        }
        info_obj.insert("version".to_string(), json!(self.info.version));
        doc.insert("info".to_string(), Value::Object(info_obj));

        let mut components_extra = None;
        for (key, value) in &self.extension_data {
            if key == "components" && self.schema_type == SchemaType::OpenApi3 {
                components_extra = value.as_object().cloned();
                continue;
            }
            doc.insert(key.clone(), value.clone());
        }

        if self.schema_type == SchemaType::Swagger2 {
            if !self.consumes.is_empty() {
                doc.insert("consumes".to_string(), json!(self.consumes));
            }
            if !self.produces.is_empty() {
                doc.insert("produces".to_string(), json!(self.produces));
            }
        }

        let mut paths = Map::new();
        for (path, item) in &self.paths {
            paths.insert(path.clone(), self.path_item_value(item));
        }
        doc.insert("paths".to_string(), Value::Object(paths));

        let definitions = self
            .definitions
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Map<_, _>>();
        match self.schema_type {
            SchemaType::Swagger2 => {
                doc.insert("definitions".to_string(), Value::Object(definitions));
            }
            SchemaType::OpenApi3 => {
                let mut components = Map::new();
                components.insert("schemas".to_string(), Value::Object(definitions));
                if let Some(extra) = components_extra {
                    for (k, v) in extra {
                        components.entry(k).or_insert(v);
                    }
                }
                doc.insert("components".to_string(), Value::Object(components));
            }
        }

        if !self.tags.is_empty() {
            let tags = self.tags.iter().map(tag_value).collect::<Vec<_>>();
            doc.insert("tags".to_string(), Value::Array(tags));
        }

        Value::Object(doc)
    }

    fn path_item_value(&self, item: &PathItem) -> Value {
        let mut obj = Map::new();
        for (method, op) in item.iter() {
            obj.insert(method.as_str().to_string(), self.operation_value(op));
        }
        Value::Object(obj)
    }

    fn operation_value(&self, op: &Operation) -> Value {
        let mut obj = Map::new();
        if !op.tags.is_empty() {
            obj.insert("tags".to_string(), json!(op.tags));
        }
        if let Some(summary) = &op.summary {
            obj.insert("summary".to_string(), json!(summary));
        }
        if let Some(desc) = &op.description {
            obj.insert("description".to_string(), json!(desc));
        }
        obj.insert("operationId".to_string(), json!(op.operation_id));

        match self.schema_type {
            SchemaType::Swagger2 => self.swagger2_operation(op, &mut obj),
            SchemaType::OpenApi3 => self.openapi3_operation(op, &mut obj),
        }

        if op.is_deprecated {
            obj.insert("deprecated".to_string(), json!(true));
        }
        for (key, value) in &op.extension_data {
            obj.insert(key.clone(), value.clone());
        }
        Value::Object(obj)
    }

    fn swagger2_operation(&self, op: &Operation, obj: &mut Map<String, Value>) {
        if let Some(consumes) = &op.consumes {
            obj.insert("consumes".to_string(), json!(consumes));
        }
        if let Some(produces) = &op.produces {
            obj.insert("produces".to_string(), json!(produces));
        }
        if !op.parameters.is_empty() {
            let params = op
                .parameters
                .iter()
                .map(swagger2_parameter)
                .collect::<Vec<_>>();
            obj.insert("parameters".to_string(), Value::Array(params));
        }

        let mut responses = Map::new();
        for (status, response) in &op.responses {
            let mut r = Map::new();
            r.insert("description".to_string(), json!(response.description));
            if let Some(schema) = &response.schema {
                r.insert("schema".to_string(), schema.clone());
                if response.is_nullable {
                    r.insert("x-nullable".to_string(), json!(true));
                }
            }
            responses.insert(status.clone(), Value::Object(r));
        }
        obj.insert("responses".to_string(), Value::Object(responses));
    }

    fn openapi3_operation(&self, op: &Operation, obj: &mut Map<String, Value>) {
        let params = op
            .parameters
            .iter()
            .filter(|p| !matches!(p.kind, ParameterKind::Body | ParameterKind::FormData))
            .map(openapi3_parameter)
            .collect::<Vec<_>>();
        if !params.is_empty() {
            obj.insert("parameters".to_string(), Value::Array(params));
        }

        let consumes = op.consumes.as_ref().unwrap_or(&self.consumes);
        if let Some(body) = op.body_parameter() {
            obj.insert("requestBody".to_string(), openapi3_body(body, consumes));
        } else if let Some(form) = openapi3_form_body(op, consumes) {
            obj.insert("requestBody".to_string(), form);
        }

        let produces = op.produces.as_ref().unwrap_or(&self.produces);
        let mut responses = Map::new();
        for (status, response) in &op.responses {
            responses.insert(status.clone(), openapi3_response(response, produces));
        }
        obj.insert("responses".to_string(), Value::Object(responses));
    }
}

fn tag_value(tag: &Tag) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), json!(tag.name));
    if let Some(desc) = &tag.description {
        obj.insert("description".to_string(), json!(desc));
    }
    Value::Object(obj)
}

fn swagger2_parameter(param: &Parameter) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), json!(param.name));
    obj.insert("in".to_string(), json!(param.kind.as_str()));
    if let Some(desc) = &param.description {
        obj.insert("description".to_string(), json!(desc));
    }
    obj.insert("required".to_string(), json!(param.is_required));

    if param.kind == ParameterKind::Body {
        obj.insert("schema".to_string(), param.schema.clone());
    } else {
        let inline = match &param.primitive_fallback {
            Some(fallback) => {
                obj.insert("x-schema".to_string(), param.schema.clone());
                fallback.clone()
            }
            None if is_complex_schema(&param.schema) => {
                obj.insert("x-schema".to_string(), param.schema.clone());
                json!({ "type": "string" })
            }
            None => swagger2_file_schema(&param.schema),
        };
        if let Value::Object(fields) = inline {
            for (k, v) in fields {
                if k != "nullable" {
                    obj.insert(k, v);
                }
            }
        }
        if let Some(format) = param.collection_format {
            obj.insert("collectionFormat".to_string(), json!(format.as_str()));
        }
        if let Some(default) = &param.default {
            obj.insert("default".to_string(), default.clone());
        }
    }

    if param.is_nullable {
        obj.insert("x-nullable".to_string(), json!(true));
    }
    if let Some(position) = param.position {
        obj.insert("x-position".to_string(), json!(position));
    }
    Value::Object(obj)
}

fn is_binary_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("string")
        && schema.get("format").and_then(Value::as_str) == Some("binary")
}

/// References, objects and compositions cannot be inlined on a Swagger 2.0
/// non-body parameter.
fn is_complex_schema(schema: &Value) -> bool {
    ["$ref", "allOf", "oneOf", "anyOf"]
        .iter()
        .any(|key| schema.get(*key).is_some())
        || schema.get("type").and_then(Value::as_str) == Some("object")
}

/// Swagger 2.0 spells binary form fields as `type: file`.
fn swagger2_file_schema(schema: &Value) -> Value {
    if is_binary_schema(schema) {
        return json!({ "type": "file" });
    }
    if let Some(items) = schema.get("items") {
        if is_binary_schema(items) {
            return json!({ "type": "array", "items": { "type": "file" } });
        }
    }
    schema.clone()
}

fn openapi3_parameter(param: &Parameter) -> Value {
    let mut obj = Map::new();
    obj.insert("name".to_string(), json!(param.name));
    obj.insert("in".to_string(), json!(param.kind.as_str()));
    if let Some(desc) = &param.description {
        obj.insert("description".to_string(), json!(desc));
    }
    obj.insert("required".to_string(), json!(param.is_required));

    let mut schema = param.schema.clone();
    if param.is_nullable {
        schema = make_nullable_schema(schema, SchemaType::OpenApi3);
    }
    if let (Some(default), Value::Object(map)) = (&param.default, &mut schema) {
        map.insert("default".to_string(), default.clone());
    }
    obj.insert("schema".to_string(), schema);

    if param.collection_format == Some(super::CollectionFormat::Multi) {
        obj.insert("style".to_string(), json!("form"));
        obj.insert("explode".to_string(), json!(true));
    }
    if let Some(position) = param.position {
        obj.insert("x-position".to_string(), json!(position));
    }
    Value::Object(obj)
}

fn openapi3_body(body: &Parameter, consumes: &[String]) -> Value {
    let mut schema = body.schema.clone();
    if body.is_nullable {
        schema = make_nullable_schema(schema, SchemaType::OpenApi3);
    }
    let mut content = Map::new();
    for media_type in consumes {
        content.insert(media_type.clone(), json!({ "schema": schema }));
    }

    let mut obj = Map::new();
    obj.insert("x-name".to_string(), json!(body.name));
    if let Some(desc) = &body.description {
        obj.insert("description".to_string(), json!(desc));
    }
    obj.insert("content".to_string(), Value::Object(content));
    obj.insert("required".to_string(), json!(body.is_required));
    if let Some(position) = body.position {
        obj.insert("x-position".to_string(), json!(position));
    }
    Value::Object(obj)
}

fn openapi3_form_body(op: &Operation, consumes: &[String]) -> Option<Value> {
    let fields: Vec<&Parameter> = op
        .parameters
        .iter()
        .filter(|p| p.kind == ParameterKind::FormData)
        .collect();
    if fields.is_empty() {
        return None;
    }

    let mut properties: IndexMap<String, Value> = IndexMap::new();
    let mut required = Vec::new();
    for field in &fields {
        let mut schema = field.schema.clone();
        if field.is_nullable {
            schema = make_nullable_schema(schema, SchemaType::OpenApi3);
        }
        if let Some(desc) = &field.description {
            if let Value::Object(map) = &mut schema {
                map.insert("description".to_string(), json!(desc));
            }
        }
        properties.insert(field.name.clone(), schema);
        if field.is_required {
            required.push(field.name.clone());
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    schema.insert(
        "properties".to_string(),
        Value::Object(properties.into_iter().collect()),
    );
    let schema = Value::Object(schema);

    let form_types: Vec<&String> = consumes
        .iter()
        .filter(|c| c.starts_with("multipart/") || c.as_str() == FORM_URLENCODED)
        .collect();
    let mut content = Map::new();
    if form_types.is_empty() {
        content.insert(FORM_URLENCODED.to_string(), json!({ "schema": schema }));
    } else {
        for media_type in form_types {
            content.insert(media_type.clone(), json!({ "schema": schema }));
        }
    }
    Some(json!({ "content": content }))
}

fn openapi3_response(response: &Response, produces: &[String]) -> Value {
    let mut obj = Map::new();
    obj.insert("description".to_string(), json!(response.description));
    if let Some(schema) = &response.schema {
        let binary = is_binary_schema(schema);
        let schema = if response.is_nullable {
            make_nullable_schema(schema.clone(), SchemaType::OpenApi3)
        } else {
            schema.clone()
        };
        let mut content = Map::new();
        if binary {
            content.insert(OCTET_STREAM.to_string(), json!({ "schema": schema }));
        } else {
            for media_type in produces {
                content.insert(media_type.clone(), json!({ "schema": schema }));
            }
        }
        obj.insert("content".to_string(), Value::Object(content));
    }
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::HttpMethod;
    use crate::model::CollectionFormat;
    use crate::settings::DocumentInfo;
    use pretty_assertions::assert_eq;

    fn sample(schema_type: SchemaType) -> Document {
        let mut doc = Document::new(DocumentInfo::default(), schema_type);
        doc.consumes = vec!["application/json".into()];
        doc.produces = vec!["application/json".into()];

        let mut ids = Parameter::new(
            "ids",
            ParameterKind::Query,
            json!({ "type": "array", "items": { "type": "integer", "format": "int32" } }),
        );
        ids.collection_format = Some(CollectionFormat::Multi);
        ids.position = Some(1);

        let mut body = Parameter::new(
            "person",
            ParameterKind::Body,
            json!({ "$ref": format!("{}Person", schema_type.definitions_pointer()) }),
        );
        body.is_required = true;
        body.is_nullable = true;
        body.position = Some(2);

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                schema: Some(json!({ "type": "string" })),
                is_nullable: false,
                description: "OK".into(),
            },
        );

        let op = Operation {
            operation_id: "Persons_Post".into(),
            tags: vec!["Persons".into()],
            parameters: vec![ids, body],
            responses,
            ..Default::default()
        };
        doc.add_operation("/api/Persons", HttpMethod::Post, op).unwrap();
        doc.definitions
            .insert("Person".into(), json!({ "type": "object" }));
        doc
    }

    #[test]
    fn test_swagger2_shape() {
        let value = sample(SchemaType::Swagger2).to_json();
        assert_eq!(value["swagger"], json!("2.0"));
        assert_eq!(value["consumes"], json!(["application/json"]));
        let op = &value["paths"]["/api/Persons"]["post"];
        assert_eq!(
            op["parameters"][0],
            json!({
                "name": "ids",
                "in": "query",
                "required": false,
                "type": "array",
                "items": { "type": "integer", "format": "int32" },
                "collectionFormat": "multi",
                "x-position": 1
            })
        );
        assert_eq!(op["parameters"][1]["in"], json!("body"));
        assert_eq!(
            op["parameters"][1]["schema"],
            json!({ "$ref": "#/definitions/Person" })
        );
        assert_eq!(op["parameters"][1]["x-nullable"], json!(true));
        assert_eq!(op["responses"]["200"]["schema"], json!({ "type": "string" }));
        assert!(value["definitions"]["Person"].is_object());
    }

    #[test]
    fn test_openapi3_shape() {
        let value = sample(SchemaType::OpenApi3).to_json();
        assert_eq!(value["openapi"], json!("3.0.0"));
        assert!(value.get("consumes").is_none());
        let op = &value["paths"]["/api/Persons"]["post"];
        assert_eq!(op["parameters"].as_array().unwrap().len(), 1);
        assert_eq!(op["parameters"][0]["style"], json!("form"));
        assert_eq!(op["parameters"][0]["explode"], json!(true));
        assert_eq!(
            op["requestBody"]["content"]["application/json"]["schema"],
            json!({
                "nullable": true,
                "oneOf": [{ "$ref": "#/components/schemas/Person" }]
            })
        );
        assert_eq!(op["requestBody"]["x-name"], json!("person"));
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"],
            json!({ "type": "string" })
        );
        assert!(value["components"]["schemas"]["Person"].is_object());
    }

    #[test]
    fn test_openapi3_form_body() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::OpenApi3);
        let mut files = Parameter::new(
            "Files",
            ParameterKind::FormData,
            json!({ "type": "array", "items": { "type": "string", "format": "binary" } }),
        );
        files.is_required = true;
        let title = Parameter::new("Title", ParameterKind::FormData, json!({ "type": "string" }));
        let op = Operation {
            operation_id: "Upload".into(),
            parameters: vec![files, title],
            consumes: Some(vec!["multipart/form-data".into()]),
            ..Default::default()
        };
        doc.add_operation("/upload", HttpMethod::Post, op).unwrap();

        let value = doc.to_json();
        let schema = &value["paths"]["/upload"]["post"]["requestBody"]["content"]
            ["multipart/form-data"]["schema"];
        assert_eq!(schema["required"], json!(["Files"]));
        assert_eq!(
            schema["properties"]["Files"]["items"]["format"],
            json!("binary")
        );
        assert_eq!(schema["properties"]["Title"], json!({ "type": "string" }));
    }

    #[test]
    fn test_swagger2_file_and_enum_fallback() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::Swagger2);
        let file = Parameter::new(
            "upload",
            ParameterKind::FormData,
            json!({ "type": "string", "format": "binary" }),
        );
        let mut status = Parameter::new(
            "status",
            ParameterKind::Path,
            json!({ "$ref": "#/definitions/Status" }),
        );
        status.primitive_fallback = Some(json!({ "type": "integer", "format": "int32" }));
        status.is_required = true;
        let op = Operation {
            operation_id: "Op".into(),
            parameters: vec![file, status],
            ..Default::default()
        };
        doc.add_operation("/x/{status}", HttpMethod::Post, op).unwrap();
        let value = doc.to_json();
        let params = &value["paths"]["/x/{status}"]["post"]["parameters"];
        assert_eq!(params[0]["type"], json!("file"));
        assert_eq!(params[1]["type"], json!("integer"));
        assert_eq!(params[1]["x-schema"], json!({ "$ref": "#/definitions/Status" }));
    }

    #[test]
    fn test_openapi3_binary_response_is_octet_stream() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::OpenApi3);
        doc.produces = vec!["application/json".into()];
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                schema: Some(json!({ "type": "string", "format": "binary" })),
                is_nullable: true,
                description: String::new(),
            },
        );
        let op = Operation {
            operation_id: "Download".into(),
            responses,
            ..Default::default()
        };
        doc.add_operation("/download", HttpMethod::Get, op).unwrap();
        let value = doc.to_json();
        let content = &value["paths"]["/download"]["get"]["responses"]["200"]["content"];
        assert!(content.get("application/json").is_none());
        assert_eq!(
            content["application/octet-stream"]["schema"]["format"],
            json!("binary")
        );
    }

    #[test]
    fn test_swagger2_complex_query_parameter_is_string() {
        let mut doc = Document::new(DocumentInfo::default(), SchemaType::Swagger2);
        let filter = Parameter::new(
            "filter",
            ParameterKind::Query,
            json!({ "$ref": "#/definitions/Filter" }),
        );
        let op = Operation {
            operation_id: "Search".into(),
            parameters: vec![filter],
            ..Default::default()
        };
        doc.add_operation("/search", HttpMethod::Get, op).unwrap();
        let value = doc.to_json();
        let param = &value["paths"]["/search"]["get"]["parameters"][0];
        assert_eq!(param["type"], json!("string"));
        assert!(param.get("$ref").is_none());
        assert_eq!(param["x-schema"], json!({ "$ref": "#/definitions/Filter" }));
    }
}
