//! ASP.NET Core conventions.

use super::{FrameworkAdapter, RouteTemplate};
use crate::descriptor::{ActionDescriptor, Attribute, ControllerDescriptor};
use regex::Regex;
use std::sync::OnceLock;

/// Controller-level `Route` acts as the prefix; verb attributes may carry templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspNetCoreAdapter;

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"(?i)\[(controller|action|area)\]").expect("Invalid regex")
    })
}

impl FrameworkAdapter for AspNetCoreAdapter {
    fn name(&self) -> &'static str {
        "aspnetcore"
    }

    fn route_prefixes(&self, controller: &ControllerDescriptor) -> Vec<String> {
        controller
            .attributes
            .iter()
            .filter_map(|a| match a {
                Attribute::Route { template, .. } => Some(template.clone()),
                Attribute::RoutePrefix { prefix } => Some(prefix.clone()),
                _ => None,
            })
            .collect()
    }

    fn route_templates(&self, action: &ActionDescriptor) -> Vec<RouteTemplate> {
        action
            .attributes
            .iter()
            .filter_map(|a| match a {
                Attribute::Route { template, name } => Some(RouteTemplate {
                    template: template.clone(),
                    name: name.clone(),
                    method: None,
                }),
                Attribute::HttpMethod {
                    method,
                    template: Some(template),
                    name,
                } => Some(RouteTemplate {
                    template: template.clone(),
                    name: name.clone(),
                    method: Some(*method),
                }),
                _ => None,
            })
            .collect()
    }

    fn expand_tokens(
        &self,
        template: &str,
        controller: &ControllerDescriptor,
        action: &ActionDescriptor,
    ) -> String {
        token_regex()
            .replace_all(template, |caps: &regex::Captures<'_>| {
                match caps[1].to_ascii_lowercase().as_str() {
                    "controller" => controller.short_name().to_string(),
                    "action" => action.name.clone(),
                    _ => String::new(),
                }
            })
            .into_owned()
    }
}
