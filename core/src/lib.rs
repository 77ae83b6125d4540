#![deny(missing_docs)]

//! # OASGen Core
//!
//! Builds Swagger 2.0 / OpenAPI 3.0 documents from reflected web API
//! controllers.
//!
//! The pipeline resolves the routes of every controller action, materializes
//! parameters and responses through a schema service, assembles operations,
//! runs the processor chain over them and reconciles the finished document.

/// Shared error types.
pub mod error;

/// Generator settings.
pub mod settings;

/// Reflection snapshot (controllers, actions, named types).
pub mod descriptor;

/// Generated document model and serialization.
pub mod model;

/// Schema service.
pub mod schema;

/// Return type wrapper registry.
pub mod wrappers;

/// Hosting framework conventions.
pub mod adapter;

/// Route resolution.
pub mod routing;

/// Parameter and response materialization.
pub mod materialize;

/// Operation assembly.
pub mod assembler;

/// Operation and document processors.
pub mod processors;

/// Document generation.
pub mod generator;

/// Lazily built document cache for hosting.
pub mod serve;

pub use adapter::{adapter_for, AspNetCoreAdapter, FrameworkAdapter, WebApiAdapter};
pub use assembler::{OperationAssembler, OperationDescription};
pub use descriptor::{
    ActionDescriptor, ApiDescription, Attribute, BindingSource, ControllerDescriptor, HttpMethod,
    ParameterDescriptor, ReflectionSnapshot, TypeCatalog, TypeDef, TypeRef,
};
pub use error::{AppError, AppResult};
pub use generator::{DocumentGenerator, PostProcessHook};
pub use model::{Document, Operation, Parameter, ParameterKind, PathItem, Response, Tag};
pub use processors::{
    DocumentProcessor, DocumentProcessorContext, OperationProcessor, OperationProcessorContext,
    ProcessorRegistry,
};
pub use schema::{JsonSchemaGenerator, SchemaRef, SchemaResolver};
pub use serve::DocumentCache;
pub use settings::{DocumentInfo, Framework, GeneratorSettings, NullHandling, SchemaType};
pub use wrappers::{WrapperRegistry, WrapperRule};
