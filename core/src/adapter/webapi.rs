//! Classic Web API conventions.

use super::{FrameworkAdapter, RouteTemplate};
use crate::descriptor::{ActionDescriptor, Attribute, ControllerDescriptor};

/// `RoutePrefix` on controllers, `Route` on actions, `~/` for absolute routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebApiAdapter;

impl FrameworkAdapter for WebApiAdapter {
    fn name(&self) -> &'static str {
        "web-api"
    }

    fn route_prefixes(&self, controller: &ControllerDescriptor) -> Vec<String> {
        controller
            .attributes
            .iter()
            .filter_map(|a| match a {
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
                _ => None,
            })
            .collect()
    }

    fn expand_tokens(
        &self,
        template: &str,
        _controller: &ControllerDescriptor,
        _action: &ActionDescriptor,
    ) -> String {
        template.to_string()
    }
}
