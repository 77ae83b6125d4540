//! # Document Processors
//!
//! Aggregate controller-level declarations into the document.

use super::{extension_key, DocumentProcessor, DocumentProcessorContext};
use crate::descriptor::Attribute;
use crate::error::AppResult;
use crate::model::Tag;

/// Adds declared tag descriptions, then every tag used by an operation.
pub struct DocumentTagsProcessor;

impl DocumentProcessor for DocumentTagsProcessor {
    fn process(&self, context: &mut DocumentProcessorContext<'_>) -> AppResult<()> {
        for controller in context.controllers {
            for attribute in &controller.attributes {
                if let Attribute::TagDescription { name, description } = attribute {
                    context.document.add_tag(Tag {
                        name: name.clone(),
                        description: description.clone(),
                    });
                }
            }
        }

        let used: Vec<String> = context
            .document
            .operations()
            .flat_map(|(_, _, op)| op.tags.iter().cloned())
            .collect();
        for name in used {
            context.document.add_tag(Tag {
                name,
                description: None,
            });
        }
        Ok(())
    }
}

/// Copies document extension data declared on controllers.
pub struct DocumentExtensionDataProcessor;

impl DocumentProcessor for DocumentExtensionDataProcessor {
    fn process(&self, context: &mut DocumentProcessorContext<'_>) -> AppResult<()> {
        for controller in context.controllers {
            for attribute in &controller.attributes {
                if let Attribute::DocumentExtensionData { key, value } = attribute {
                    context
                        .document
                        .extension_data
                        .insert(extension_key(key), value.clone());
                }
            }
        }
        Ok(())
    }
}
