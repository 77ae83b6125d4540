#![deny(missing_docs)]

//! # Route Resolution
//!
//! Turns a controller chain and one of its actions into the `(path, method)`
//! pairs the action is served on, and normalizes paths supplied by a host's
//! native API explorer.

pub mod template;

use crate::adapter::FrameworkAdapter;
use crate::descriptor::{ActionDescriptor, ControllerDescriptor, HttpMethod};
use crate::settings::GeneratorSettings;
use template::{expand_optional, join, lowercase_literals, normalize_path, placeholders, remove_placeholder};
use tracing::debug;

/// One `(path, method)` pair an action is served on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Normalized path with a leading slash.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Route name declared alongside the template.
    pub route_name: Option<String>,
}

/// Resolves routes from attributes and conventions.
pub struct RouteResolver<'a> {
    adapter: &'a dyn FrameworkAdapter,
    settings: &'a GeneratorSettings,
}

impl<'a> RouteResolver<'a> {
    /// Creates a resolver.
    pub fn new(adapter: &'a dyn FrameworkAdapter, settings: &'a GeneratorSettings) -> Self {
        Self { adapter, settings }
    }

    /// The routes of `action`.
    ///
    /// `chain` is the controller the action is served from followed by its
    /// bases, most-derived first; the first level declaring a non-empty prefix
    /// provides it.
    pub fn resolve(
        &self,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
    ) -> Vec<ResolvedRoute> {
        let Some(controller) = chain.first().copied() else {
            return Vec::new();
        };
        let prefix = self.route_prefix(chain, action);
        let templates = self.adapter.route_templates(action);
        let methods = self.http_methods(action);

        // Verbs declared without a template of their own.
        let free: Vec<HttpMethod> = methods
            .iter()
            .copied()
            .filter(|m| !templates.iter().any(|t| t.method == Some(*m)))
            .collect();

        let mut combined: Vec<(String, Option<String>, Vec<HttpMethod>)> = Vec::new();
        for route in &templates {
            let expanded = self
                .adapter
                .expand_tokens(&route.template, controller, action);
            let path = if let Some(absolute) = expanded.strip_prefix("~/") {
                absolute.to_string()
            } else if expanded.starts_with('/') {
                expanded
            } else {
                match &prefix {
                    Some(prefix) => join(prefix, &expanded),
                    None => expanded,
                }
            };
            let verbs = match route.method {
                Some(method) => vec![method],
                None if free.is_empty() => methods.clone(),
                None => free.clone(),
            };
            combined.push((path, route.name.clone(), verbs));
        }
        let has_unbound_template = templates.iter().any(|t| t.method.is_none());
        if templates.is_empty() || (!has_unbound_template && !free.is_empty()) {
            let path = match &prefix {
                Some(prefix) => prefix.clone(),
                None => self.default_template(controller, action),
            };
            let verbs = if templates.is_empty() { methods.clone() } else { free.clone() };
            combined.push((path, None, verbs));
        }

        let has_parameter = |name: &str| {
            action
                .parameters
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(name))
        };
        let mut routes: Vec<ResolvedRoute> = Vec::new();
        for (template, route_name, verbs) in combined {
            for variant in expand_optional(&template, &has_parameter) {
                let mut path = normalize_path(&variant);
                if self.settings.lowercase_paths {
                    path = lowercase_literals(&path);
                }
                for method in &verbs {
                    if routes.iter().any(|r| r.path == path && r.method == *method) {
                        continue;
                    }
                    debug!(
                        controller = %controller.name,
                        action = %action.name,
                        %path,
                        %method,
                        "Resolved route"
                    );
                    routes.push(ResolvedRoute {
                        path: path.clone(),
                        method: *method,
                        route_name: route_name.clone(),
                    });
                }
            }
        }
        routes
    }

    /// The route prefix of the first level that declares a non-empty one.
    pub fn route_prefix(
        &self,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
    ) -> Option<String> {
        let controller = chain.first().copied()?;
        chain.iter().find_map(|level| {
            self.adapter
                .route_prefixes(level)
                .into_iter()
                .find(|p| !p.trim().is_empty())
                .map(|p| self.adapter.expand_tokens(&p, controller, action))
        })
    }

    /// Explicit verbs, else the verb the action name starts with, else POST.
    pub fn http_methods(&self, action: &ActionDescriptor) -> Vec<HttpMethod> {
        let explicit = self.adapter.http_methods(action);
        if !explicit.is_empty() {
            return explicit;
        }
        vec![infer_method(&action.name)]
    }

    fn default_template(&self, controller: &ControllerDescriptor, action: &ActionDescriptor) -> String {
        self.settings
            .default_url_template
            .replace("{controller}", controller.short_name())
            .replace("{action}", &action.name)
    }
}

/// Infers the verb from the action name prefix (`GetAll` → GET).
pub fn infer_method(action_name: &str) -> HttpMethod {
    HttpMethod::ALL
        .into_iter()
        .find(|m| {
            let verb = m.as_str();
            action_name.len() >= verb.len()
                && action_name.is_char_boundary(verb.len())
                && action_name[..verb.len()].eq_ignore_ascii_case(verb)
        })
        .unwrap_or(HttpMethod::Post)
}

/// Result of normalizing a path supplied by a native API explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePath {
    /// Normalized path.
    pub path: String,
    /// Placeholders kept without a bound parameter.
    pub unbound: Vec<String>,
}

/// Normalizes a native relative path.
///
/// Placeholders whose name is not among `bound_path_parameters` are removed
/// with their segment unless `keep_unbound_path_parameters` is set, in which
/// case they are reported in [`NativePath::unbound`].
pub fn normalize_native_path(
    relative_path: &str,
    bound_path_parameters: &[String],
    settings: &GeneratorSettings,
) -> NativePath {
    let mut path = relative_path.to_string();
    let mut unbound = Vec::new();
    for name in placeholders(relative_path) {
        if bound_path_parameters
            .iter()
            .any(|b| b.eq_ignore_ascii_case(&name))
        {
            continue;
        }
        if settings.keep_unbound_path_parameters {
            unbound.push(name);
        } else {
            path = remove_placeholder(&path, &name);
        }
    }
    let mut path = normalize_path(&path);
    if settings.lowercase_paths {
        path = lowercase_literals(&path);
    }
    NativePath { path, unbound }
}
