//! # Type References
//!
//! Type expressions as they appear in a reflection snapshot
//! (`Vec<Person>`, `int32?`, `Task<ActionResult<Person>>`, `Map<string, int64>`).
//! Parsing follows the same bracket-aware splitting the schema side uses.

use crate::descriptor::catalog::{TypeCatalog, TypeKind};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalar and opaque types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Text.
    String,
    /// `true` / `false`.
    Boolean,
    /// 32-bit integer (also covers 8/16-bit integers).
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Decimal number.
    Decimal,
    /// Globally unique identifier.
    Uuid,
    /// Timestamp.
    DateTime,
    /// Calendar date.
    Date,
    /// Time span.
    Duration,
    /// Single byte.
    Byte,
    /// Single character.
    Char,
    /// Absolute or relative URI.
    Uri,
    /// Untyped object.
    Any,
    /// An uploaded / downloaded file.
    File,
    /// A raw byte stream.
    Stream,
    /// A raw XML document.
    Xml,
    /// An untyped HTTP response message or action result.
    HttpResponse,
    /// No value.
    Void,
}

impl Primitive {
    fn from_name(name: &str) -> Option<Self> {
        let p = match name {
            "string" | "String" | "str" => Primitive::String,
            "bool" | "boolean" => Primitive::Boolean,
            "int" | "int32" | "i32" | "int16" | "i16" | "u16" | "sbyte" | "i8" | "uint" | "u32" => {
                Primitive::Int32
            }
            "long" | "int64" | "i64" | "ulong" | "u64" => Primitive::Int64,
            "float" | "f32" => Primitive::Float,
            "double" | "f64" => Primitive::Double,
            "decimal" => Primitive::Decimal,
            "uuid" | "guid" | "Uuid" => Primitive::Uuid,
            "datetime" | "date-time" | "DateTime" | "NaiveDateTime" => Primitive::DateTime,
            "date" | "NaiveDate" => Primitive::Date,
            "duration" | "timespan" => Primitive::Duration,
            "byte" | "u8" => Primitive::Byte,
            "char" => Primitive::Char,
            "uri" => Primitive::Uri,
            "any" | "object" => Primitive::Any,
            "file" => Primitive::File,
            "stream" => Primitive::Stream,
            "xml" => Primitive::Xml,
            "http-response" => Primitive::HttpResponse,
            "void" | "()" => Primitive::Void,
            _ => return None,
        };
        Some(p)
    }

    /// Canonical spelling used when rendering a type expression.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Boolean => "bool",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Decimal => "decimal",
            Primitive::Uuid => "uuid",
            Primitive::DateTime => "datetime",
            Primitive::Date => "date",
            Primitive::Duration => "duration",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Uri => "uri",
            Primitive::Any => "any",
            Primitive::File => "file",
            Primitive::Stream => "stream",
            Primitive::Xml => "xml",
            Primitive::HttpResponse => "http-response",
            Primitive::Void => "void",
        }
    }

    /// Whether values of this type can never be null unless wrapped.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            Primitive::Boolean
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::Float
                | Primitive::Double
                | Primitive::Decimal
                | Primitive::Uuid
                | Primitive::DateTime
                | Primitive::Date
                | Primitive::Duration
                | Primitive::Byte
                | Primitive::Char
        )
    }
}

/// A reflected type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A built-in type.
    Primitive(Primitive),
    /// A type defined in the [`TypeCatalog`].
    Named(String),
    /// A sequence of items.
    Array(Box<TypeRef>),
    /// A dictionary from key type to value type.
    Map(Box<TypeRef>, Box<TypeRef>),
    /// A nullable wrapper (`T?`, `Option<T>`).
    Nullable(Box<TypeRef>),
    /// Any other generic instantiation (`Task<T>`, `Page<Person>`).
    Generic(String, Vec<TypeRef>),
}

impl TypeRef {
    /// Parses a type expression.
    pub fn parse(expr: &str) -> AppResult<Self> {
        let ty = expr.trim();
        if ty.is_empty() {
            return Err(AppError::Reflection("Empty type expression".into()));
        }

        if let Some(inner) = ty.strip_suffix('?') {
            return Ok(TypeRef::Nullable(Box::new(TypeRef::parse(inner)?)));
        }
        if let Some(inner) = ty.strip_suffix("[]") {
            return Ok(TypeRef::Array(Box::new(TypeRef::parse(inner)?)));
        }
        if ty == "files" {
            return Ok(TypeRef::Array(Box::new(TypeRef::Primitive(Primitive::File))));
        }

        if let Some((base, inner)) = split_generic(ty) {
            let args = split_generic_args(inner)
                .iter()
                .map(|a| TypeRef::parse(a))
                .collect::<AppResult<Vec<_>>>()?;
            return match (base, args.len()) {
                ("Option" | "Nullable", 1) => Ok(TypeRef::Nullable(Box::new(first(args)?))),
                ("Vec" | "List" | "IList" | "ICollection" | "IEnumerable" | "HashSet"
                | "Set" | "Array", 1) => Ok(TypeRef::Array(Box::new(first(args)?))),
                ("Map" | "HashMap" | "BTreeMap" | "Dictionary" | "IDictionary", 2) => {
                    let mut it = args.into_iter();
                    match (it.next(), it.next()) {
                        (Some(k), Some(v)) => Ok(TypeRef::Map(Box::new(k), Box::new(v))),
                        _ => Err(AppError::Reflection(format!("Invalid map type: {}", ty))),
                    }
                }
                ("Option" | "Nullable" | "Vec" | "List" | "Map" | "HashMap" | "Dictionary", n) => {
                    Err(AppError::Reflection(format!(
                        "Type '{}' has {} generic arguments",
                        ty, n
                    )))
                }
                (name, _) => Ok(TypeRef::Generic(name.to_string(), args)),
            };
        }

        if let Some(p) = Primitive::from_name(ty) {
            return Ok(TypeRef::Primitive(p));
        }

        let is_identifier = ty
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == ':');
        if !is_identifier || ty.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(AppError::Reflection(format!(
                "Invalid type expression: '{}'",
                expr
            )));
        }
        Ok(TypeRef::Named(ty.to_string()))
    }

    /// Shorthand for a primitive.
    pub fn primitive(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }

    /// Shorthand for a catalog type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// The `void` type.
    pub fn void() -> Self {
        TypeRef::Primitive(Primitive::Void)
    }

    /// Whether the type is explicitly nullable.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    /// Strips any nullable wrappers.
    pub fn non_nullable(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner.non_nullable(),
            other => other,
        }
    }

    /// Whether the type is `void`.
    pub fn is_void(&self) -> bool {
        matches!(self.non_nullable(), TypeRef::Primitive(Primitive::Void))
    }

    /// The item type if this is a sequence.
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self.non_nullable() {
            TypeRef::Array(inner) => Some(inner),
            _ => None,
        }
    }

    /// Whether this is a sequence.
    pub fn is_array(&self) -> bool {
        self.element_type().is_some()
    }

    /// Whether this is a dictionary.
    pub fn is_map(&self) -> bool {
        matches!(self.non_nullable(), TypeRef::Map(..))
    }

    /// Whether this is a single file.
    pub fn is_file(&self) -> bool {
        matches!(self.non_nullable(), TypeRef::Primitive(Primitive::File))
    }

    /// Whether this is a single file or a collection of files.
    pub fn is_file_like(&self) -> bool {
        self.is_file() || self.element_type().is_some_and(TypeRef::is_file)
    }

    /// Whether this is a binary payload without structure (file, stream, response message).
    pub fn is_binary(&self) -> bool {
        matches!(
            self.non_nullable(),
            TypeRef::Primitive(Primitive::File | Primitive::Stream | Primitive::HttpResponse)
        )
    }

    /// Returns the primitive kind if this is a (possibly nullable) primitive.
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.non_nullable() {
            TypeRef::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether the type cannot hold null unless wrapped in a nullable.
    ///
    /// Catalog enums are value types; objects only when flagged as such.
    pub fn is_value_type(&self, catalog: &TypeCatalog) -> bool {
        match self {
            TypeRef::Primitive(p) => p.is_value_type(),
            TypeRef::Named(name) => catalog.get(name).is_some_and(|def| match &def.kind {
                TypeKind::Enum { .. } => true,
                TypeKind::Object { value_type, .. } => *value_type,
            }),
            _ => false,
        }
    }

    /// Whether the type is an enum from the catalog.
    pub fn is_enum(&self, catalog: &TypeCatalog) -> bool {
        match self.non_nullable() {
            TypeRef::Named(name) => catalog
                .get(name)
                .is_some_and(|def| matches!(def.kind, TypeKind::Enum { .. })),
            _ => false,
        }
    }

    /// Whether values are rendered as plain scalars (primitives and enums).
    pub fn is_simple(&self, catalog: &TypeCatalog) -> bool {
        match self.non_nullable() {
            TypeRef::Primitive(p) => !matches!(
                p,
                Primitive::Any | Primitive::File | Primitive::Stream | Primitive::HttpResponse
            ),
            other => other.is_enum(catalog),
        }
    }

    /// Whether the type is a catalog object (as opposed to a primitive, enum,
    /// sequence or dictionary).
    pub fn is_complex(&self, catalog: &TypeCatalog) -> bool {
        match self.non_nullable() {
            TypeRef::Named(name) => catalog
                .get(name)
                .is_none_or(|def| matches!(def.kind, TypeKind::Object { .. })),
            TypeRef::Generic(..) => true,
            TypeRef::Primitive(Primitive::Any) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.as_str()),
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Array(inner) => write!(f, "Vec<{}>", inner),
            TypeRef::Map(k, v) => write!(f, "Map<{}, {}>", k, v),
            TypeRef::Nullable(inner) => write!(f, "Option<{}>", inner),
            TypeRef::Generic(name, args) => {
                let args = args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
                write!(f, "{}<{}>", name, args.join(", "))
            }
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl std::str::FromStr for TypeRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

fn first(args: Vec<TypeRef>) -> AppResult<TypeRef> {
    args.into_iter()
        .next()
        .ok_or_else(|| AppError::Reflection("Generic list empty".into()))
}

fn split_generic(ty: &str) -> Option<(&str, &str)> {
    let start = ty.find('<')?;
    if !ty.ends_with('>') {
        return None;
    }
    let base = ty[..start].trim();
    let base = base.rsplit("::").next().unwrap_or(base);
    let base = base.rsplit('.').next().unwrap_or(base);
    let inner = &ty[start + 1..ty.len() - 1];
    Some((base, inner))
}

fn split_generic_args(inner: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in inner.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }

    args
}
