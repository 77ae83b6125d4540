//! # Wrapper Registry
//!
//! Return types are often wrapped (`Task<ActionResult<Person>>`). The registry
//! knows which wrapper types carry a payload type argument and which stand for
//! "no payload" or "untyped payload".

use crate::descriptor::{Primitive, TypeRef};
use indexmap::IndexMap;

/// What a wrapper type means for the documented payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperRule {
    /// The payload is the generic argument at this index.
    Inner(usize),
    /// No payload (a non-generic async task).
    Void,
    /// An untyped payload, documented as binary.
    Opaque,
}

/// Name to rule table. Generic and non-generic uses of a name are kept apart,
/// so `Task<T>` and `Task` can mean different things.
#[derive(Debug, Clone)]
pub struct WrapperRegistry {
    generic: IndexMap<String, WrapperRule>,
    plain: IndexMap<String, WrapperRule>,
}

const MAX_DEPTH: usize = 16;

impl Default for WrapperRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for name in [
            "Task",
            "ValueTask",
            "ActionResult",
            "JsonResult",
            "VersionedActionResult",
            "Future",
        ] {
            registry.register(name, WrapperRule::Inner(0));
        }
        registry.register("Task", WrapperRule::Void);
        registry.register("ValueTask", WrapperRule::Void);
        registry.register("IActionResult", WrapperRule::Opaque);
        registry.register("ActionResult", WrapperRule::Opaque);
        registry.register("IHttpActionResult", WrapperRule::Opaque);
        registry.register("HttpResponseMessage", WrapperRule::Opaque);
        registry
    }
}

impl WrapperRegistry {
    /// A registry without any rules.
    pub fn empty() -> Self {
        Self {
            generic: IndexMap::new(),
            plain: IndexMap::new(),
        }
    }

    /// Registers a rule. `Inner` applies to generic uses of the name, the
    /// other rules to non-generic uses.
    pub fn register(&mut self, name: impl Into<String>, rule: WrapperRule) {
        match rule {
            WrapperRule::Inner(_) => self.generic.insert(name.into(), rule),
            WrapperRule::Void | WrapperRule::Opaque => self.plain.insert(name.into(), rule),
        };
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_rule(mut self, name: impl Into<String>, rule: WrapperRule) -> Self {
        self.register(name, rule);
        self
    }

    /// Whether the type is a known wrapper.
    pub fn is_wrapper(&self, ty: &TypeRef) -> bool {
        self.step(ty.non_nullable()).is_some()
    }

    /// Strips wrappers until the payload type is reached.
    ///
    /// Outer nullability survives unwrapping. `Void` yields `void`, `Opaque`
    /// yields the untyped HTTP response primitive.
    pub fn unwrap(&self, ty: &TypeRef) -> TypeRef {
        let nullable = ty.is_nullable();
        let mut current = ty.non_nullable().clone();
        for _ in 0..MAX_DEPTH {
            match self.step(&current) {
                Some(next) => current = next,
                None => break,
            }
        }
        if nullable && !current.is_void() && !current.is_nullable() {
            TypeRef::Nullable(Box::new(current))
        } else {
            current
        }
    }

    fn step(&self, ty: &TypeRef) -> Option<TypeRef> {
        match ty.non_nullable() {
            TypeRef::Generic(name, args) => match self.generic.get(short(name))? {
                WrapperRule::Inner(index) => args.get(*index).cloned(),
                _ => None,
            },
            TypeRef::Named(name) => match self.plain.get(short(name))? {
                WrapperRule::Void => Some(TypeRef::void()),
                WrapperRule::Opaque => Some(TypeRef::Primitive(Primitive::HttpResponse)),
                WrapperRule::Inner(_) => None,
            },
            _ => None,
        }
    }
}

fn short(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
