//! # JSON Schema Generator
//!
//! Default [`SchemaResolver`]. Walks the [`TypeCatalog`] and registers one
//! definition per `(type, is_dictionary_key)` pair.

use super::{
    apply_validation, make_nullable_schema, primitive_schema, SchemaRef, SchemaResolver,
};
use crate::descriptor::{Attribute, AttributeExt, TypeCatalog, TypeDef, TypeKind, TypeRef};
use crate::error::{AppError, AppResult};
use crate::settings::SchemaType;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Whether a named type is being opened up or referenced.
///
/// Only the definition being generated has its properties inlined; every
/// named type reached from it is emitted as a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Root,
    Nested,
}

/// Catalog-backed schema generator.
pub struct JsonSchemaGenerator<'a> {
    catalog: &'a TypeCatalog,
    schema_type: SchemaType,
    refs: HashMap<(String, bool), String>,
    definitions: IndexMap<String, Value>,
}

impl<'a> JsonSchemaGenerator<'a> {
    /// Creates a generator over a catalog.
    pub fn new(catalog: &'a TypeCatalog, schema_type: SchemaType) -> Self {
        Self {
            catalog,
            schema_type,
            refs: HashMap::new(),
            definitions: IndexMap::new(),
        }
    }

    fn schema_for(&mut self, ty: &TypeRef, attributes: &[Attribute], scope: Scope) -> AppResult<Value> {
        let mut schema = match ty.non_nullable() {
            TypeRef::Primitive(p) => primitive_schema(*p, self.schema_type),
            TypeRef::Array(item) => {
                let items = self.member_schema(item, &[])?;
                json!({ "type": "array", "items": items })
            }
            TypeRef::Map(key, value) => {
                let mut obj = Map::new();
                obj.insert("type".to_string(), json!("object"));
                if key.is_enum(self.catalog) {
                    let key_ref = self.get_schema(key, true)?;
                    obj.insert("x-dictionaryKey".to_string(), key_ref.to_value());
                }
                obj.insert(
                    "additionalProperties".to_string(),
                    self.member_schema(value, &[])?,
                );
                Value::Object(obj)
            }
            named @ (TypeRef::Named(_) | TypeRef::Generic(..)) => match scope {
                Scope::Nested => self.get_schema(named, false)?.to_value(),
                Scope::Root => {
                    let def = self.lookup(named)?;
                    self.definition_body(def, false)?
                }
            },
            TypeRef::Nullable(_) => json!({}),
        };
        apply_validation(&mut schema, attributes);
        Ok(schema)
    }

    /// Schema of an array item, dictionary value or property; nullability is applied here.
    fn member_schema(&mut self, ty: &TypeRef, attributes: &[Attribute]) -> AppResult<Value> {
        let schema = self.schema_for(ty, attributes, Scope::Nested)?;
        let nullable = attributes.nullability().unwrap_or_else(|| ty.is_nullable());
        Ok(if nullable {
            make_nullable_schema(schema, self.schema_type)
        } else {
            schema
        })
    }

    fn lookup(&self, ty: &TypeRef) -> AppResult<&'a TypeDef> {
        let catalog = self.catalog;
        let found = match ty.non_nullable() {
            TypeRef::Named(name) => catalog.get(name),
            TypeRef::Generic(base, _) => catalog
                .get(&ty.non_nullable().to_string())
                .or_else(|| catalog.get(base)),
            _ => None,
        };
        found.ok_or_else(|| {
            AppError::Reflection(format!("Type '{}' is not part of the type catalog", ty))
        })
    }

    fn definition_name(&self, ty: &TypeRef, is_dictionary_key: bool) -> String {
        let mut name = display_name(ty.non_nullable());
        if is_dictionary_key {
            name.push_str("Key");
        }
        if !self.definitions.contains_key(&name) {
            return name;
        }
        (2..)
            .map(|n| format!("{}{}", name, n))
            .find(|candidate| !self.definitions.contains_key(candidate))
            .unwrap_or(name)
    }

    fn definition_body(&mut self, def: &TypeDef, is_dictionary_key: bool) -> AppResult<Value> {
        let mut schema = match &def.kind {
            TypeKind::Enum { values, as_string } => {
                let names: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
                if *as_string || is_dictionary_key {
                    json!({ "type": "string", "x-enumNames": names, "enum": names })
                } else {
                    let numbers: Vec<i64> = values.iter().map(|v| v.value).collect();
                    json!({
                        "type": "integer",
                        "format": "int32",
                        "x-enumNames": names,
                        "enum": numbers
                    })
                }
            }
            TypeKind::Object {
                properties, base, ..
            } => {
                let own = self.object_schema(properties)?;
                match base {
                    Some(base) => {
                        let base_ref = self.get_schema(&TypeRef::named(base.clone()), false)?;
                        json!({ "allOf": [base_ref.to_value(), own] })
                    }
                    None => own,
                }
            }
        };
        if let (Some(desc), Value::Object(obj)) = (&def.description, &mut schema) {
            obj.insert("description".to_string(), json!(desc));
        }
        Ok(schema)
    }

    fn object_schema(&mut self, properties: &[crate::descriptor::PropertyDef]) -> AppResult<Value> {
        let mut props = Map::new();
        let mut required = Vec::new();
        for prop in properties {
            if prop.attributes.is_ignored() {
                continue;
            }
            let name = prop.attributes.json_name().unwrap_or(&prop.name).to_string();
            let mut schema = self.member_schema(&prop.ty, &prop.attributes)?;
            if let (Some(desc), Value::Object(obj)) = (&prop.description, &mut schema) {
                if !obj.contains_key("$ref") {
                    obj.insert("description".to_string(), json!(desc));
                }
            }
            if prop.attributes.is_required_marker() {
                required.push(name.clone());
            }
            props.insert(name, schema);
        }

        let mut obj = Map::new();
        obj.insert("type".to_string(), json!("object"));
        if !required.is_empty() {
            obj.insert("required".to_string(), json!(required));
        }
        obj.insert("properties".to_string(), Value::Object(props));
        Ok(Value::Object(obj))
    }
}

impl SchemaResolver for JsonSchemaGenerator<'_> {
    fn generate(&mut self, ty: &TypeRef, attributes: &[Attribute]) -> AppResult<Value> {
        self.schema_for(ty, attributes, Scope::Nested)
    }

    fn has_schema(&self, ty: &TypeRef, is_dictionary_key: bool) -> bool {
        self.refs
            .contains_key(&(ty.non_nullable().to_string(), is_dictionary_key))
    }

    fn get_schema(&mut self, ty: &TypeRef, is_dictionary_key: bool) -> AppResult<SchemaRef> {
        let ty = ty.non_nullable();
        let key = (ty.to_string(), is_dictionary_key);
        if let Some(name) = self.refs.get(&key) {
            return Ok(SchemaRef::new(name.clone(), self.schema_type));
        }

        let def = self.lookup(ty)?;
        if is_dictionary_key && !matches!(def.kind, TypeKind::Enum { .. }) {
            return self.get_schema(ty, false);
        }

        let name = self.definition_name(ty, is_dictionary_key);
        debug!(schema = %name, ty = %ty, "Registering schema definition");
        // Registered before the body so self-referencing types terminate.
        self.refs.insert(key, name.clone());
        self.definitions.insert(name.clone(), Value::Null);

        let body = if is_dictionary_key {
            self.definition_body(def, true)?
        } else {
            self.schema_for(ty, &[], Scope::Root)?
        };
        self.definitions.insert(name.clone(), body);
        Ok(SchemaRef::new(name, self.schema_type))
    }

    fn definitions(&self) -> &IndexMap<String, Value> {
        &self.definitions
    }

    fn take_definitions(&mut self) -> IndexMap<String, Value> {
        std::mem::take(&mut self.definitions)
    }

    fn schema_type(&self) -> SchemaType {
        self.schema_type
    }
}

/// `Page<Person>` becomes `PageOfPerson`, `Pair<A, B>` becomes `PairOfAAndB`.
fn display_name(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Named(name) => name.rsplit('.').next().unwrap_or(name).to_string(),
        TypeRef::Generic(base, args) => {
            let args = args.iter().map(display_name).collect::<Vec<_>>();
            format!("{}Of{}", base, args.join("And"))
        }
        TypeRef::Array(inner) => format!("{}Array", display_name(inner)),
        TypeRef::Map(k, v) => format!("DictionaryOf{}And{}", display_name(k), display_name(v)),
        TypeRef::Nullable(inner) => display_name(inner),
        TypeRef::Primitive(p) => {
            let s = p.as_str();
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}
