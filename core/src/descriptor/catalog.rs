//! # Type Catalog
//!
//! Named type definitions referenced by [`TypeRef::Named`](super::TypeRef::Named).

use crate::descriptor::attributes::Attribute;
use crate::descriptor::types::TypeRef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A property of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Member name as declared.
    pub name: String,
    /// Member type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Doc comment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes declared on the member.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

/// A single enum member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    /// Member name.
    pub name: String,
    /// Numeric value.
    pub value: i64,
}

/// What a named type is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    /// A class or struct with properties.
    Object {
        /// Declared public properties.
        #[serde(default)]
        properties: Vec<PropertyDef>,
        /// Base type name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<String>,
        /// Whether the type is a value type (cannot be null unless wrapped).
        #[serde(default)]
        value_type: bool,
    },
    /// An enumeration.
    Enum {
        /// Members in declaration order.
        values: Vec<EnumValue>,
        /// Whether the enum is serialized by member name.
        #[serde(default)]
        as_string: bool,
    },
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name (also the schema definition name).
    pub name: String,
    /// Doc comment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Attributes declared on the type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Shape of the type.
    #[serde(flatten)]
    pub kind: TypeKind,
}

impl TypeDef {
    /// Properties of an object type (empty for enums).
    pub fn properties(&self) -> &[PropertyDef] {
        match &self.kind {
            TypeKind::Object { properties, .. } => properties,
            TypeKind::Enum { .. } => &[],
        }
    }
}

/// All named types known to one reflection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TypeDef>", into = "Vec<TypeDef>")]
pub struct TypeCatalog {
    types: IndexMap<String, TypeDef>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a definition.
    pub fn insert(&mut self, def: TypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    /// Builder-style insert.
    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.insert(def);
        self
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Iterates definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Public properties of an object type including inherited ones, base first.
    pub fn all_properties(&self, name: &str) -> Vec<&PropertyDef> {
        let mut chain = Vec::new();
        let mut current = self.get(name);
        while let Some(def) = current {
            if chain.iter().any(|d: &&TypeDef| d.name == def.name) {
                break;
            }
            chain.push(def);
            current = match &def.kind {
                TypeKind::Object {
                    base: Some(base), ..
                } => self.get(base),
                _ => None,
            };
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|def| def.properties().iter())
            .collect()
    }
}

impl From<Vec<TypeDef>> for TypeCatalog {
    fn from(value: Vec<TypeDef>) -> Self {
        let mut catalog = TypeCatalog::new();
        for def in value {
            catalog.insert(def);
        }
        catalog
    }
}

impl From<TypeCatalog> for Vec<TypeDef> {
    fn from(value: TypeCatalog) -> Self {
        value.types.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog() {
        let yaml = r#"
- name: Person
  kind: object
  properties:
    - name: Id
      type: uuid
    - name: Name
      type: string?
- name: Status
  kind: enum
  values:
    - { name: Active, value: 0 }
    - { name: Inactive, value: 1 }
"#;
        let catalog: TypeCatalog = serde_yaml::from_str(yaml).unwrap();
        let person = catalog.get("Person").unwrap();
        assert_eq!(person.properties().len(), 2);
        assert!(TypeRef::named("Status").is_enum(&catalog));
        assert!(TypeRef::named("Status").is_value_type(&catalog));
        assert!(!TypeRef::named("Person").is_value_type(&catalog));
    }

    #[test]
    fn test_inherited_properties_base_first() {
        let catalog = TypeCatalog::new()
            .with_type(TypeDef {
                name: "Entity".into(),
                description: None,
                attributes: vec![],
                kind: TypeKind::Object {
                    properties: vec![PropertyDef {
                        name: "Id".into(),
                        ty: TypeRef::parse("int64").unwrap(),
                        description: None,
                        attributes: vec![],
                    }],
                    base: None,
                    value_type: false,
                },
            })
            .with_type(TypeDef {
                name: "Car".into(),
                description: None,
                attributes: vec![],
                kind: TypeKind::Object {
                    properties: vec![PropertyDef {
                        name: "Make".into(),
                        ty: TypeRef::parse("string").unwrap(),
                        description: None,
                        attributes: vec![],
                    }],
                    base: Some("Entity".into()),
                    value_type: false,
                },
            });

        let names: Vec<_> = catalog
            .all_properties("Car")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Id", "Make"]);
    }
}
