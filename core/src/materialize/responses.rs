//! # Response Materializer
//!
//! Declared response attributes replace everything else. Without them, the
//! host's supported response types are used, and without those the unwrapped
//! return type becomes a single `200` response.

use super::MaterializeContext;
use crate::descriptor::{
    ActionDescriptor, ApiResponseType, Attribute, ControllerDescriptor, ResponseStatus, TypeRef,
};
use crate::error::AppResult;
use crate::model::Response;
use crate::schema::{binary_schema, SchemaResolver};
use crate::settings::{NullHandling, SchemaType};
use indexmap::IndexMap;

/// Builds the response map of an operation.
pub struct ResponseMaterializer<'a> {
    ctx: MaterializeContext<'a>,
}

/// Response attribute fields, borrowed.
struct Declared<'d> {
    status: ResponseStatus,
    ty: Option<&'d TypeRef>,
    description: Option<&'d str>,
    nullable: Option<bool>,
}

/// The response used when an operation would otherwise document none:
/// an unknown, possibly empty binary payload.
pub fn fallback_response(schema_type: SchemaType) -> Response {
    Response {
        schema: Some(binary_schema(schema_type)),
        is_nullable: true,
        description: String::new(),
    }
}

impl<'a> ResponseMaterializer<'a> {
    /// Creates a materializer.
    pub fn new(ctx: MaterializeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Responses of `action`.
    ///
    /// `chain` is the serving controller followed by its bases; the first
    /// level declaring response attributes is the class-level fallback.
    /// `supported` carries the host's response metadata, when there is any.
    pub fn materialize(
        &self,
        resolver: &mut dyn SchemaResolver,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
        supported: Option<&[ApiResponseType]>,
    ) -> AppResult<IndexMap<String, Response>> {
        let mut responses = IndexMap::new();

        let declared = self.declared(chain, action);
        if !declared.is_empty() {
            for entry in declared {
                let key = entry.status.to_string();
                let response = self.response(
                    resolver,
                    action,
                    &entry.status,
                    entry.ty,
                    entry.nullable,
                    entry.description,
                )?;
                responses.insert(key, response);
            }
        } else if let Some(supported) = supported.filter(|s| !s.is_empty()) {
            for entry in supported {
                let status = if entry.is_default_response {
                    ResponseStatus::Default
                } else {
                    ResponseStatus::Code(entry.status_code)
                };
                let ty = match &entry.ty {
                    Some(ty) => Some(ty),
                    None if status.is_success() => Some(&action.return_type),
                    None => None,
                };
                let response = self.response(resolver, action, &status, ty, None, None)?;
                responses.insert(status.to_string(), response);
            }
        } else {
            let status = ResponseStatus::Code(200);
            let response = self.response(
                resolver,
                action,
                &status,
                Some(&action.return_type),
                None,
                None,
            )?;
            responses.insert(status.to_string(), response);
        }
        Ok(responses)
    }

    fn declared<'d>(
        &self,
        chain: &[&'d ControllerDescriptor],
        action: &'d ActionDescriptor,
    ) -> Vec<Declared<'d>> {
        let collect = |attributes: &'d [Attribute]| -> Vec<Declared<'d>> {
            attributes
                .iter()
                .filter_map(|a| match a {
                    Attribute::ResponseType {
                        status,
                        ty,
                        description,
                        nullable,
                    } => Some(Declared {
                        status: *status,
                        ty: ty.as_ref(),
                        description: description.as_deref(),
                        nullable: *nullable,
                    }),
                    _ => None,
                })
                .collect()
        };
        let on_action = collect(&action.attributes);
        if !on_action.is_empty() {
            return on_action;
        }
        chain
            .iter()
            .map(|c| collect(&c.attributes))
            .find(|d| !d.is_empty())
            .unwrap_or_default()
    }

    fn response(
        &self,
        resolver: &mut dyn SchemaResolver,
        action: &ActionDescriptor,
        status: &ResponseStatus,
        ty: Option<&TypeRef>,
        nullable: Option<bool>,
        description: Option<&str>,
    ) -> AppResult<Response> {
        let payload = ty
            .map(|t| self.ctx.wrappers.unwrap(t))
            .filter(|t| !t.is_void());

        let schema = match &payload {
            None => None,
            Some(t) if t.is_binary() => Some(binary_schema(self.ctx.settings.schema_type)),
            Some(t) => Some(resolver.generate(t.non_nullable(), &[])?),
        };

        let is_nullable = match &payload {
            None => false,
            Some(t) => nullable
                .or(action.return_nullable)
                .unwrap_or_else(|| self.default_nullability(t)),
        };

        let description = description
            .map(str::to_string)
            .or_else(|| {
                status
                    .is_success()
                    .then(|| action.docs.as_ref().and_then(|d| d.returns.clone()))
                    .flatten()
            })
            .unwrap_or_else(|| status.reason_phrase().to_string());

        Ok(Response {
            schema,
            is_nullable,
            description,
        })
    }

    fn default_nullability(&self, ty: &TypeRef) -> bool {
        if ty.is_nullable() {
            return true;
        }
        if ty.is_value_type(self.ctx.catalog) {
            return false;
        }
        self.ctx.settings.default_response_null_handling == NullHandling::Null
    }
}
