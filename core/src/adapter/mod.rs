#![deny(missing_docs)]

//! # Framework Adapters
//!
//! Hosting frameworks disagree on where route prefixes live, which tokens a
//! template may contain and how parameters bind by default. Each framework
//! gets one [`FrameworkAdapter`] exposing typed accessors over the reflected
//! attributes, so the routing and materialization code stays framework-free.

mod aspnetcore;
mod webapi;

pub use aspnetcore::AspNetCoreAdapter;
pub use webapi::WebApiAdapter;

use crate::descriptor::{
    ActionDescriptor, Attribute, AttributeExt, BindingSource, ControllerDescriptor,
    HttpMethod, ParameterDescriptor, TypeCatalog,
};
use crate::settings::Framework;

/// A route template declared on an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    /// Template text.
    pub template: String,
    /// Declared route name.
    pub name: Option<String>,
    /// The verb the template was declared with; `None` serves every verb of the action.
    pub method: Option<HttpMethod>,
}

/// The binding decided for one method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Where the value comes from.
    pub source: BindingSource,
    /// Name on the wire.
    pub name: String,
}

/// Typed access to framework-specific routing and binding conventions.
pub trait FrameworkAdapter: Send + Sync {
    /// Framework name, for logging.
    fn name(&self) -> &'static str;

    /// Route prefixes declared on one controller level (not its bases).
    fn route_prefixes(&self, controller: &ControllerDescriptor) -> Vec<String>;

    /// Route templates declared on an action.
    fn route_templates(&self, action: &ActionDescriptor) -> Vec<RouteTemplate>;

    /// HTTP methods declared explicitly on an action (verb and accept-verbs attributes).
    fn http_methods(&self, action: &ActionDescriptor) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for attr in &action.attributes {
            match attr {
                Attribute::HttpMethod { method, .. } => methods.push(*method),
                Attribute::AcceptVerbs { methods: verbs } => methods.extend(verbs.iter().copied()),
                _ => {}
            }
        }
        dedup(methods)
    }

    /// Binding of a method parameter given the placeholders of the route it is served on.
    fn binding_source(
        &self,
        parameter: &ParameterDescriptor,
        path_placeholders: &[String],
        catalog: &TypeCatalog,
    ) -> Binding {
        conventional_binding(parameter, path_placeholders, catalog)
    }

    /// Whether a member carrying these attributes is excluded from the document.
    fn is_ignored(&self, attributes: &[Attribute]) -> bool {
        attributes.is_ignored()
    }

    /// Whether a public method is not an action.
    fn is_non_action(&self, action: &ActionDescriptor) -> bool {
        action
            .attributes
            .iter()
            .any(|a| matches!(a, Attribute::NonAction))
    }

    /// Replaces framework tokens in a template.
    fn expand_tokens(
        &self,
        template: &str,
        controller: &ControllerDescriptor,
        action: &ActionDescriptor,
    ) -> String;
}

/// The adapter for a framework setting.
pub fn adapter_for(framework: Framework) -> Box<dyn FrameworkAdapter> {
    match framework {
        Framework::WebApi => Box::new(WebApiAdapter),
        Framework::AspNetCore => Box::new(AspNetCoreAdapter),
    }
}

/// Binding rules shared by both frameworks.
///
/// An explicit binding attribute wins. Otherwise a name matching a route
/// placeholder binds from the path, file-like values from the form, complex
/// values from the body and everything else from the query string.
pub fn conventional_binding(
    parameter: &ParameterDescriptor,
    path_placeholders: &[String],
    catalog: &TypeCatalog,
) -> Binding {
    if let Some((source, name)) = parameter.attributes.binding() {
        return Binding {
            source,
            name: name.unwrap_or(&parameter.name).to_string(),
        };
    }

    let source = if path_placeholders
        .iter()
        .any(|p| p.eq_ignore_ascii_case(&parameter.name))
    {
        BindingSource::Path
    } else if parameter.ty.is_file_like() || parameter.attributes.is_file_marker() {
        BindingSource::Form
    } else if parameter.ty.is_complex(catalog)
        || (parameter.ty.is_array()
            && parameter
                .ty
                .element_type()
                .is_some_and(|item| item.is_complex(catalog)))
    {
        BindingSource::Body
    } else {
        BindingSource::Query
    };
    Binding {
        source,
        name: parameter.name.clone(),
    }
}

fn dedup(methods: Vec<HttpMethod>) -> Vec<HttpMethod> {
    let mut out: Vec<HttpMethod> = Vec::with_capacity(methods.len());
    for m in methods {
        if !out.contains(&m) {
            out.push(m);
        }
    }
    out
}
