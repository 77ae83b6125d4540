#![deny(missing_docs)]

//! # Operation Assembler
//!
//! Combines a resolved route with materialized parameters and responses into
//! an [`Operation`], assigning the natural operation id and media types and
//! enforcing the single body parameter invariant.

use crate::descriptor::{
    ActionDescriptor, ApiDescription, Attribute, AttributeExt, ControllerDescriptor, HttpMethod,
};
use crate::error::AppResult;
use crate::materialize::{
    MaterializeContext, MaterializedParameters, ParameterMaterializer, ResponseMaterializer,
};
use crate::model::Operation;
use crate::routing::{NativePath, ResolvedRoute};
use crate::schema::SchemaResolver;
use crate::settings::GeneratorSettings;

const MULTIPART: &str = "multipart/form-data";

/// An operation together with where it is served.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescription {
    /// Normalized path.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// The operation.
    pub operation: Operation,
}

/// Builds [`OperationDescription`]s.
pub struct OperationAssembler<'a> {
    ctx: MaterializeContext<'a>,
}

impl<'a> OperationAssembler<'a> {
    /// Creates an assembler.
    pub fn new(ctx: MaterializeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Assembles an operation for a route resolved from attributes and conventions.
    pub fn assemble(
        &self,
        resolver: &mut dyn SchemaResolver,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
        route: &ResolvedRoute,
    ) -> AppResult<OperationDescription> {
        let parameters =
            ParameterMaterializer::new(self.ctx).from_action(resolver, action, &route.path)?;
        self.build(
            resolver,
            chain,
            action,
            route.method,
            route.route_name.as_deref(),
            parameters,
            None,
        )
    }

    /// Assembles an operation from a host's native API description.
    pub fn assemble_native(
        &self,
        resolver: &mut dyn SchemaResolver,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
        description: &ApiDescription,
        native: &NativePath,
        method: HttpMethod,
    ) -> AppResult<OperationDescription> {
        let parameters = ParameterMaterializer::new(self.ctx)
            .from_api_description(resolver, action, description, native)?;
        let route_name = self
            .ctx
            .adapter
            .route_templates(action)
            .into_iter()
            .find_map(|r| r.name);
        self.build(
            resolver,
            chain,
            action,
            method,
            route_name.as_deref(),
            parameters,
            Some(description),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        &self,
        resolver: &mut dyn SchemaResolver,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
        method: HttpMethod,
        route_name: Option<&str>,
        parameters: MaterializedParameters,
        description: Option<&ApiDescription>,
    ) -> AppResult<OperationDescription> {
        let supported = description.map(|d| d.supported_response_types.as_slice());
        let responses =
            ResponseMaterializer::new(self.ctx).materialize(resolver, chain, action, supported)?;

        let controller_name = chain.first().map(|c| c.short_name()).unwrap_or_default();
        let MaterializedParameters {
            parameters,
            path,
            consumes: implied_consumes,
        } = parameters;

        let mut operation = Operation {
            operation_id: natural_operation_id(
                controller_name,
                action,
                route_name,
                self.ctx.settings,
            ),
            parameters,
            responses,
            is_deprecated: action.attributes.is_obsolete()
                || chain.first().is_some_and(|c| c.attributes.is_obsolete()),
            ..Default::default()
        };

        operation.consumes = if operation.has_file_parameter() {
            Some(vec![MULTIPART.to_string()])
        } else {
            declared_media(chain, action, |a| match a {
                Attribute::Consumes { media_types } => Some(media_types),
                _ => None,
            })
            .or(implied_consumes)
        };
        operation.produces = declared_media(chain, action, |a| match a {
            Attribute::Produces { media_types } => Some(media_types),
            _ => None,
        });

        operation.ensure_single_body()?;
        Ok(OperationDescription {
            path,
            method,
            operation,
        })
    }
}

/// The id an operation gets before collision handling.
///
/// An explicit id attribute wins, then (when enabled) the route name, then
/// `{Controller}_{Action}` with a trailing `Async` dropped from the action.
pub fn natural_operation_id(
    controller_name: &str,
    action: &ActionDescriptor,
    route_name: Option<&str>,
    settings: &GeneratorSettings,
) -> String {
    let explicit = action.attributes.iter().find_map(|a| match a {
        Attribute::OperationId { id } if !id.trim().is_empty() => Some(id.clone()),
        _ => None,
    });
    if let Some(id) = explicit {
        return id;
    }
    if settings.use_route_name_as_operation_id {
        if let Some(name) = route_name.filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
    }
    let action_name = match action.name.strip_suffix("Async") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => action.name.as_str(),
    };
    format!("{}_{}", controller_name, action_name)
}

/// Media types declared on the action, else on the nearest controller level.
fn declared_media<'d>(
    chain: &[&'d ControllerDescriptor],
    action: &'d ActionDescriptor,
    pick: impl Fn(&'d Attribute) -> Option<&'d Vec<String>>,
) -> Option<Vec<String>> {
    action
        .attributes
        .iter()
        .find_map(&pick)
        .or_else(|| chain.iter().find_map(|c| c.attributes.iter().find_map(&pick)))
        .filter(|types| !types.is_empty())
        .cloned()
}
