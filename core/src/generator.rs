#![deny(missing_docs)]

//! # Document Generator
//!
//! Orchestrates route resolution, materialization, assembly and the
//! processor pipeline over every controller action of a reflection snapshot,
//! then reconciles document-level media types and operation ids.
//!
//! Controllers and actions are processed strictly in snapshot order; the
//! first registration of a `(path, method)` pair wins and later same-level
//! registrations fail.

use crate::adapter::{adapter_for, FrameworkAdapter};
use crate::assembler::{OperationAssembler, OperationDescription};
use crate::descriptor::{
    ActionDescriptor, ApiDescription, Attribute, BindingSource, ControllerDescriptor, HttpMethod,
    ReflectionSnapshot,
};
use crate::error::{AppError, AppResult};
use crate::materialize::responses::fallback_response;
use crate::materialize::MaterializeContext;
use crate::model::Document;
use crate::processors::{
    default_document_processors, default_operation_processors, run_operation_chain,
    DocumentProcessor, DocumentProcessorContext, OperationProcessor, OperationProcessorContext,
    ProcessorRegistry, ResolvedProcessors,
};
use crate::routing::{infer_method, normalize_native_path, RouteResolver};
use crate::schema::{JsonSchemaGenerator, SchemaResolver};
use crate::settings::GeneratorSettings;
use crate::wrappers::{WrapperRegistry, WrapperRule};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback run on the finished document, after every processor.
pub type PostProcessHook = Box<dyn Fn(&mut Document) -> AppResult<()> + Send + Sync>;

/// Generates documents from reflection snapshots.
pub struct DocumentGenerator {
    settings: GeneratorSettings,
    adapter: Box<dyn FrameworkAdapter>,
    wrappers: WrapperRegistry,
    operation_processors: Vec<Arc<dyn OperationProcessor>>,
    document_processors: Vec<Arc<dyn DocumentProcessor>>,
    registry: ProcessorRegistry,
    post_process: Option<PostProcessHook>,
}

impl DocumentGenerator {
    /// Creates a generator, failing fast on invalid settings.
    pub fn new(settings: GeneratorSettings) -> AppResult<Self> {
        settings.validate()?;
        Ok(Self {
            adapter: adapter_for(settings.framework),
            settings,
            wrappers: WrapperRegistry::default(),
            operation_processors: default_operation_processors(),
            document_processors: default_document_processors(),
            registry: ProcessorRegistry::default(),
            post_process: None,
        })
    }

    /// The settings in use.
    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Replaces the framework adapter chosen from the settings.
    pub fn with_adapter(mut self, adapter: impl FrameworkAdapter + 'static) -> Self {
        self.adapter = Box::new(adapter);
        self
    }

    /// Appends an operation processor after the built-ins.
    pub fn with_operation_processor(mut self, processor: impl OperationProcessor + 'static) -> Self {
        self.operation_processors.push(Arc::new(processor));
        self
    }

    /// Appends a document processor after the built-ins.
    pub fn with_document_processor(mut self, processor: impl DocumentProcessor + 'static) -> Self {
        self.document_processors.push(Arc::new(processor));
        self
    }

    /// Registers a return type wrapper.
    pub fn with_wrapper_rule(mut self, name: impl Into<String>, rule: WrapperRule) -> Self {
        self.wrappers.register(name, rule);
        self
    }

    /// Registers a factory for processors declared through attributes.
    pub fn with_processor_factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&[Value]) -> AppResult<Arc<dyn OperationProcessor>> + Send + Sync + 'static,
    {
        self.registry.register(name, factory);
        self
    }

    /// Sets the post-process hook.
    pub fn with_post_process<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Document) -> AppResult<()> + Send + Sync + 'static,
    {
        self.post_process = Some(Box::new(hook));
        self
    }

    /// Generates the document for `snapshot`.
    ///
    /// All-or-nothing: any structural error aborts the build.
    pub fn generate(&self, snapshot: &ReflectionSnapshot) -> AppResult<Document> {
        let attribute_processors = self.registry.resolve(snapshot)?;
        let document = match self.settings.parsed_document_template()? {
            Some(template) => Document::from_template(
                template,
                self.settings.info.clone(),
                self.settings.schema_type,
            ),
            None => Document::new(self.settings.info.clone(), self.settings.schema_type),
        };

        let build = Build {
            generator: self,
            snapshot,
            ctx: MaterializeContext {
                settings: &self.settings,
                catalog: &snapshot.types,
                adapter: self.adapter.as_ref(),
                wrappers: &self.wrappers,
            },
            document,
            resolver: JsonSchemaGenerator::new(&snapshot.types, self.settings.schema_type),
            accepted: Vec::new(),
            attribute_processors,
        };
        build.run()
    }

    /// Generates the document and serializes it as pretty JSON.
    pub fn generate_json(&self, snapshot: &ReflectionSnapshot) -> AppResult<String> {
        self.generate(snapshot)?.to_json_string()
    }
}

/// State of one generation run.
struct Build<'a> {
    generator: &'a DocumentGenerator,
    snapshot: &'a ReflectionSnapshot,
    ctx: MaterializeContext<'a>,
    document: Document,
    resolver: JsonSchemaGenerator<'a>,
    accepted: Vec<OperationDescription>,
    attribute_processors: ResolvedProcessors,
}

impl<'a> Build<'a> {
    fn run(mut self) -> AppResult<Document> {
        if self.snapshot.has_api_descriptions() {
            self.native()?;
        } else {
            self.conventional()?;
        }

        for processor in &self.generator.document_processors {
            let mut context = DocumentProcessorContext {
                document: &mut self.document,
                controllers: &self.snapshot.controllers,
                catalog: &self.snapshot.types,
                resolver: &mut self.resolver,
                settings: self.ctx.settings,
            };
            processor.process(&mut context)?;
        }

        for (name, schema) in self.resolver.take_definitions() {
            self.document.definitions.entry(name).or_insert(schema);
        }

        if let Some(hook) = &self.generator.post_process {
            hook(&mut self.document)?;
        }
        reconcile_media_types(&mut self.document, self.ctx.settings);
        ensure_unique_operation_ids(&mut self.document);

        info!(
            title = %self.document.info.title,
            paths = self.document.paths.len(),
            operations = self.document.operations().count(),
            definitions = self.document.definitions.len(),
            "Generated document"
        );
        Ok(self.document)
    }

    /// Attribute and convention based discovery.
    fn conventional(&mut self) -> AppResult<()> {
        let snapshot = self.snapshot;
        let routes = RouteResolver::new(self.ctx.adapter, self.ctx.settings);

        for controller in snapshot.controllers.iter().filter(|c| !c.is_abstract) {
            let chain = snapshot.inheritance_chain(controller)?;
            let mut derived: Vec<(String, HttpMethod)> = Vec::new();

            for level in &chain {
                let mut current: Vec<(String, HttpMethod)> = Vec::new();
                for action in &level.actions {
                    if self.ctx.adapter.is_non_action(action) {
                        continue;
                    }
                    for route in routes.resolve(&chain, action) {
                        let key = (route.path.clone(), route.method);
                        if derived.contains(&key) {
                            warn!(
                                controller = %level.name,
                                action = %action.name,
                                path = %route.path,
                                method = %route.method,
                                "Skipping operation shadowed by a derived controller"
                            );
                            continue;
                        }
                        if current.contains(&key) {
                            return Err(AppError::DuplicateOperation {
                                method: route.method.to_string(),
                                path: route.path,
                            });
                        }
                        current.push(key);

                        let description = OperationAssembler::new(self.ctx).assemble(
                            &mut self.resolver,
                            &chain,
                            action,
                            &route,
                        )?;
                        let group = api_group(&chain, action);
                        self.accept(&chain, action, description, group)?;
                    }
                }
                derived.extend(current);
            }
        }
        Ok(())
    }

    /// Discovery driven by the host's native API descriptions.
    fn native(&mut self) -> AppResult<()> {
        let snapshot = self.snapshot;
        for description in &snapshot.api_descriptions {
            let controller = snapshot.controller(&description.controller).ok_or_else(|| {
                AppError::Reflection(format!(
                    "Controller '{}' of API description '{}' is not part of the snapshot",
                    description.controller, description.relative_path
                ))
            })?;
            let chain = snapshot.inheritance_chain(controller)?;
            let action = chain
                .iter()
                .find_map(|level| level.actions.iter().find(|a| a.name == description.action))
                .ok_or_else(|| {
                    AppError::Reflection(format!(
                        "Action '{}' of controller '{}' is not part of the snapshot",
                        description.action, description.controller
                    ))
                })?;

            let native = normalize_native_path(
                &description.relative_path,
                &bound_path_parameters(description),
                self.ctx.settings,
            );
            let method = description
                .http_method
                .unwrap_or_else(|| infer_method(&action.name));
            debug!(
                controller = %controller.name,
                action = %action.name,
                path = %native.path,
                %method,
                "Resolved native route"
            );

            let operation = OperationAssembler::new(self.ctx).assemble_native(
                &mut self.resolver,
                &chain,
                action,
                description,
                &native,
                method,
            )?;
            let group = description
                .group_name
                .clone()
                .or_else(|| api_group(&chain, action));
            self.accept(&chain, action, operation, group)?;
        }
        Ok(())
    }

    /// Runs the processor chain and registers the operation unless rejected.
    fn accept(
        &mut self,
        chain: &[&ControllerDescriptor],
        action: &ActionDescriptor,
        mut description: OperationDescription,
        group: Option<String>,
    ) -> AppResult<()> {
        let Some(controller) = chain.first().copied() else {
            return Ok(());
        };

        let mut processors = self.generator.operation_processors.clone();
        for level in chain {
            processors.extend(self.attribute_processors.for_attributes(&level.attributes));
        }
        processors.extend(self.attribute_processors.for_attributes(&action.attributes));

        let mut context = OperationProcessorContext {
            document: &mut self.document,
            description: &mut description,
            controller,
            action,
            catalog: &self.snapshot.types,
            resolver: &mut self.resolver,
            all_operations: &self.accepted,
            settings: self.ctx.settings,
            api_group: group.as_deref(),
        };
        if !run_operation_chain(&processors, &mut context)? {
            warn!(
                operation = %description.operation.operation_id,
                path = %description.path,
                method = %description.method,
                "Operation rejected by a processor"
            );
            return Ok(());
        }

        let operation = &mut description.operation;
        operation.ensure_single_body()?;
        operation.operation_id = self.document.unique_operation_id(&operation.operation_id);
        if operation.responses.is_empty() {
            operation
                .responses
                .insert("200".into(), fallback_response(self.ctx.settings.schema_type));
        }
        self.document
            .add_operation(&description.path, description.method, operation.clone())?;
        debug!(
            operation = %operation.operation_id,
            path = %description.path,
            method = %description.method,
            "Added operation"
        );
        self.accepted.push(description);
        Ok(())
    }
}

/// The API group declared on the action, else on the nearest controller level.
fn api_group(chain: &[&ControllerDescriptor], action: &ActionDescriptor) -> Option<String> {
    let declared = |attributes: &[Attribute]| {
        attributes.iter().find_map(|a| match a {
            Attribute::ApiGroup { name } => Some(name.clone()),
            _ => None,
        })
    };
    declared(&action.attributes).or_else(|| chain.iter().find_map(|c| declared(&c.attributes)))
}

fn bound_path_parameters(description: &ApiDescription) -> Vec<String> {
    description
        .parameters
        .iter()
        .filter(|p| p.source == BindingSource::Path)
        .map(|p| p.name.clone())
        .collect()
}

/// Moves media types shared by every operation to the document.
///
/// An operation without its own list uses the configured defaults. Operation
/// lists equal to the shared set are cleared.
pub fn reconcile_media_types(document: &mut Document, settings: &GeneratorSettings) {
    let (consumes, produces) = {
        let effective = |list: &Option<Vec<String>>, default: &Vec<String>| {
            list.clone().unwrap_or_else(|| default.clone())
        };
        let consumes: Vec<Vec<String>> = document
            .operations()
            .map(|(_, _, op)| effective(&op.consumes, &settings.default_consumes))
            .collect();
        let produces: Vec<Vec<String>> = document
            .operations()
            .map(|(_, _, op)| effective(&op.produces, &settings.default_produces))
            .collect();
        (
            common_media_types(&consumes, &settings.default_consumes),
            common_media_types(&produces, &settings.default_produces),
        )
    };

    for (_, _, operation) in document.operations_mut() {
        let own_consumes = operation
            .consumes
            .take()
            .unwrap_or_else(|| settings.default_consumes.clone());
        operation.consumes = (!same_set(&own_consumes, &consumes)).then_some(own_consumes);
        let own_produces = operation
            .produces
            .take()
            .unwrap_or_else(|| settings.default_produces.clone());
        operation.produces = (!same_set(&own_produces, &produces)).then_some(own_produces);
    }

    document.consumes = consumes;
    document.produces = produces;
}

fn common_media_types(lists: &[Vec<String>], default: &[String]) -> Vec<String> {
    let Some((first, rest)) = lists.split_first() else {
        return default.to_vec();
    };
    first
        .iter()
        .filter(|m| rest.iter().all(|list| list.contains(m)))
        .fold(Vec::new(), |mut acc, m| {
            if !acc.contains(m) {
                acc.push(m.clone());
            }
            acc
        })
}

fn same_set(a: &[String], b: &[String]) -> bool {
    a.iter().all(|m| b.contains(m)) && b.iter().all(|m| a.contains(m))
}

/// Suffixes repeated operation ids (`_2`, `_3`, ...) in document order.
pub fn ensure_unique_operation_ids(document: &mut Document) {
    let mut taken: HashSet<String> = document
        .operations()
        .map(|(_, _, op)| op.operation_id.clone())
        .collect();
    let mut seen: HashSet<String> = HashSet::new();
    for (_, _, operation) in document.operations_mut() {
        if seen.insert(operation.operation_id.clone()) {
            continue;
        }
        let base = operation.operation_id.clone();
        let unique = (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(base);
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        operation.operation_id = unique;
    }
}
