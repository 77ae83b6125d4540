#![deny(missing_docs)]

//! # Processor Pipeline
//!
//! Ordered chains of operation-level and document-level processors.
//!
//! Operation processors run in three tiers: the ones registered on the
//! generator (built-ins first), then the ones declared on the controller,
//! then the ones declared on the action. Returning `false` rejects the
//! operation; the rest of the chain is skipped and nothing is added to the
//! document. Document processors run once, after every operation is in.

pub mod builtin;
pub mod document;

pub use builtin::{
    ApiGroupFilterProcessor, DeprecateProcessor, ExcludeProcessor, IgnoreOperationProcessor,
    OperationExtensionDataProcessor, OperationSummaryProcessor, OperationTagsProcessor,
    ParameterDocumentationProcessor, RequireHeaderProcessor, TagProcessor,
};
pub use document::{DocumentExtensionDataProcessor, DocumentTagsProcessor};

use crate::assembler::OperationDescription;
use crate::descriptor::{
    ActionDescriptor, Attribute, ControllerDescriptor, ReflectionSnapshot, TypeCatalog,
};
use crate::error::{AppError, AppResult};
use crate::model::Document;
use crate::schema::SchemaResolver;
use crate::settings::GeneratorSettings;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// State handed to an [`OperationProcessor`].
pub struct OperationProcessorContext<'a> {
    /// The document built so far.
    pub document: &'a mut Document,
    /// The operation under construction.
    pub description: &'a mut OperationDescription,
    /// The controller the operation is served from.
    pub controller: &'a ControllerDescriptor,
    /// The action method.
    pub action: &'a ActionDescriptor,
    /// Named types.
    pub catalog: &'a TypeCatalog,
    /// Schema service shared by the whole build.
    pub resolver: &'a mut dyn SchemaResolver,
    /// Operations accepted so far, in discovery order.
    pub all_operations: &'a [OperationDescription],
    /// Generation settings.
    pub settings: &'a GeneratorSettings,
    /// API explorer group of the operation.
    pub api_group: Option<&'a str>,
}

/// State handed to a [`DocumentProcessor`].
pub struct DocumentProcessorContext<'a> {
    /// The assembled document.
    pub document: &'a mut Document,
    /// Controllers that were enumerated, in order.
    pub controllers: &'a [ControllerDescriptor],
    /// Named types.
    pub catalog: &'a TypeCatalog,
    /// Schema service shared by the whole build.
    pub resolver: &'a mut dyn SchemaResolver,
    /// Generation settings.
    pub settings: &'a GeneratorSettings,
}

/// Inspects, mutates or rejects one operation.
pub trait OperationProcessor: Send + Sync {
    /// Returns `false` to exclude the operation from the document.
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool>;
}

impl<F> OperationProcessor for F
where
    F: Fn(&mut OperationProcessorContext<'_>) -> AppResult<bool> + Send + Sync,
{
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        self(context)
    }
}

/// Inspects or mutates the assembled document.
pub trait DocumentProcessor: Send + Sync {
    /// Processes the document.
    fn process(&self, context: &mut DocumentProcessorContext<'_>) -> AppResult<()>;
}

impl<F> DocumentProcessor for F
where
    F: Fn(&mut DocumentProcessorContext<'_>) -> AppResult<()> + Send + Sync,
{
    fn process(&self, context: &mut DocumentProcessorContext<'_>) -> AppResult<()> {
        self(context)
    }
}

/// Runs `processors` in order until one rejects the operation.
pub fn run_operation_chain(
    processors: &[Arc<dyn OperationProcessor>],
    context: &mut OperationProcessorContext<'_>,
) -> AppResult<bool> {
    for processor in processors {
        if !processor.process(context)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The built-in operation processors in the order they run.
pub fn default_operation_processors() -> Vec<Arc<dyn OperationProcessor>> {
    vec![
        Arc::new(ApiGroupFilterProcessor),
        Arc::new(IgnoreOperationProcessor),
        Arc::new(OperationSummaryProcessor),
        Arc::new(OperationTagsProcessor),
        Arc::new(OperationExtensionDataProcessor),
        Arc::new(ParameterDocumentationProcessor),
    ]
}

/// The built-in document processors in the order they run.
pub fn default_document_processors() -> Vec<Arc<dyn DocumentProcessor>> {
    vec![
        Arc::new(DocumentTagsProcessor),
        Arc::new(DocumentExtensionDataProcessor),
    ]
}

/// Builds a processor from the arguments of its attribute.
pub type ProcessorFactory =
    Box<dyn Fn(&[Value]) -> AppResult<Arc<dyn OperationProcessor>> + Send + Sync>;

/// Named factories for processors declared through attributes.
pub struct ProcessorRegistry {
    factories: IndexMap<String, ProcessorFactory>,
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("require_header", |args: &[Value]| {
            Ok(Arc::new(RequireHeaderProcessor::from_arguments(args)?) as Arc<dyn OperationProcessor>)
        });
        registry.register("deprecate", |_: &[Value]| {
            Ok(Arc::new(DeprecateProcessor) as Arc<dyn OperationProcessor>)
        });
        registry.register("exclude", |_: &[Value]| {
            Ok(Arc::new(ExcludeProcessor) as Arc<dyn OperationProcessor>)
        });
        registry.register("tag", |args: &[Value]| {
            Ok(Arc::new(TagProcessor::from_arguments(args)?) as Arc<dyn OperationProcessor>)
        });
        registry
    }
}

impl ProcessorRegistry {
    /// A registry without any factory.
    pub fn empty() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Registers (or replaces) a factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&[Value]) -> AppResult<Arc<dyn OperationProcessor>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Whether a factory exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds one processor.
    pub fn instantiate(&self, name: &str, arguments: &[Value]) -> AppResult<Arc<dyn OperationProcessor>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            AppError::Config(format!("Unknown operation processor '{}'", name))
        })?;
        factory(arguments)
    }

    /// Instantiates every processor declared anywhere in the snapshot, once.
    pub fn resolve(&self, snapshot: &ReflectionSnapshot) -> AppResult<ResolvedProcessors> {
        let mut resolved = ResolvedProcessors::default();
        let declarations = snapshot.controllers.iter().flat_map(|c| {
            c.attributes
                .iter()
                .chain(c.actions.iter().flat_map(|a| a.attributes.iter()))
        });
        for attribute in declarations {
            if let Attribute::OperationProcessor { name, arguments } = attribute {
                if resolved.find(name, arguments).is_none() {
                    let processor = self.instantiate(name, arguments)?;
                    resolved
                        .entries
                        .push((name.clone(), arguments.clone(), processor));
                }
            }
        }
        Ok(resolved)
    }
}

/// Processor instances for attribute declarations, keyed by name and arguments.
#[derive(Default)]
pub struct ResolvedProcessors {
    entries: Vec<(String, Vec<Value>, Arc<dyn OperationProcessor>)>,
}

impl ResolvedProcessors {
    /// Number of distinct declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str, arguments: &[Value]) -> Option<&Arc<dyn OperationProcessor>> {
        self.entries
            .iter()
            .find(|(n, a, _)| n == name && a.as_slice() == arguments)
            .map(|(_, _, p)| p)
    }

    /// Instances for the declarations in `attributes`, in declaration order.
    pub fn for_attributes(&self, attributes: &[Attribute]) -> Vec<Arc<dyn OperationProcessor>> {
        attributes
            .iter()
            .filter_map(|a| match a {
                Attribute::OperationProcessor { name, arguments } => {
                    self.find(name, arguments).cloned()
                }
                _ => None,
            })
            .collect()
    }
}

/// Prefixes `x-` unless present.
pub fn extension_key(key: &str) -> String {
    if key.starts_with("x-") {
        key.to_string()
    } else {
        format!("x-{}", key)
    }
}
