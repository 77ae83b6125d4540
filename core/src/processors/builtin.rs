//! # Built-in Operation Processors
//!
//! The default chain (group filter, ignore, summary, tags, extension data,
//! parameter docs) and the processors reachable through
//! `OperationProcessor` attributes.

use super::{extension_key, OperationProcessor, OperationProcessorContext};
use crate::descriptor::{Attribute, AttributeExt};
use crate::error::{AppError, AppResult};
use crate::model::{Parameter, ParameterKind};
use serde_json::{json, Value};
use tracing::debug;

/// Rejects operations outside the configured API groups.
pub struct ApiGroupFilterProcessor;

impl OperationProcessor for ApiGroupFilterProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let groups = &context.settings.api_group_names;
        if groups.is_empty() {
            return Ok(true);
        }
        let accepted = context
            .api_group
            .is_some_and(|group| groups.iter().any(|g| g == group));
        if !accepted {
            debug!(
                operation = %context.description.operation.operation_id,
                group = ?context.api_group,
                "Operation outside of the selected API groups"
            );
        }
        Ok(accepted)
    }
}

/// Rejects actions carrying the ignore attribute.
pub struct IgnoreOperationProcessor;

impl OperationProcessor for IgnoreOperationProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        Ok(!context.action.attributes.is_ignored())
    }
}

/// Sets summary and description from attributes or documentation comments.
pub struct OperationSummaryProcessor;

impl OperationProcessor for OperationSummaryProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let attributes = &context.action.attributes;
        let docs = context.action.docs.as_ref();

        let summary = attributes
            .iter()
            .find_map(|a| match a {
                Attribute::Summary { text } => Some(text.clone()),
                _ => None,
            })
            .or_else(|| docs.and_then(|d| d.summary.clone()));
        let description = attributes
            .iter()
            .find_map(|a| match a {
                Attribute::Description { text } => Some(text.clone()),
                _ => None,
            })
            .or_else(|| docs.and_then(|d| d.remarks.clone()));

        let operation = &mut context.description.operation;
        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            operation.summary = Some(summary.trim().to_string());
        }
        if let Some(description) = description.filter(|s| !s.trim().is_empty()) {
            operation.description = Some(description.trim().to_string());
        }
        Ok(true)
    }
}

/// Tags from the action, else from the controller, else the controller name.
pub struct OperationTagsProcessor;

impl OperationProcessor for OperationTagsProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let declared = |attributes: &[Attribute]| -> Vec<String> {
            attributes
                .iter()
                .filter_map(|a| match a {
                    Attribute::Tags { tags } => Some(tags.clone()),
                    _ => None,
                })
                .flatten()
                .collect()
        };
        let mut tags = declared(&context.action.attributes);
        if tags.is_empty() {
            tags = declared(&context.controller.attributes);
        }
        if tags.is_empty() {
            tags.push(context.controller.short_name().to_string());
        }

        let operation = &mut context.description.operation;
        for tag in tags {
            if !operation.tags.contains(&tag) {
                operation.tags.push(tag);
            }
        }
        Ok(true)
    }
}

/// Copies extension data attributes of the controller and the action (action wins).
pub struct OperationExtensionDataProcessor;

impl OperationProcessor for OperationExtensionDataProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let attributes = context
            .controller
            .attributes
            .iter()
            .chain(context.action.attributes.iter());
        for attribute in attributes {
            if let Attribute::ExtensionData { key, value } = attribute {
                context
                    .description
                    .operation
                    .extension_data
                    .insert(extension_key(key), value.clone());
            }
        }
        Ok(true)
    }
}

/// Fills parameter descriptions still missing from the documentation comments.
pub struct ParameterDocumentationProcessor;

impl OperationProcessor for ParameterDocumentationProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let Some(docs) = context.action.docs.as_ref() else {
            return Ok(true);
        };
        for parameter in context
            .description
            .operation
            .parameters
            .iter_mut()
            .filter(|p| p.description.is_none())
        {
            parameter.description = docs
                .params
                .get(&parameter.original_name)
                .or_else(|| docs.params.get(&parameter.name))
                .cloned();
        }
        Ok(true)
    }
}

/// Adds a required string header to every operation it is declared for.
///
/// Arguments: header name, optional description.
pub struct RequireHeaderProcessor {
    name: String,
    description: Option<String>,
}

impl RequireHeaderProcessor {
    /// Creates the processor.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Builds the processor from attribute arguments.
    pub fn from_arguments(arguments: &[Value]) -> AppResult<Self> {
        let name = arguments
            .first()
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("Processor 'require_header' needs a header name".into())
            })?;
        let description = arguments.get(1).and_then(Value::as_str).map(str::to_string);
        Ok(Self::new(name, description))
    }
}

impl OperationProcessor for RequireHeaderProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let parameters = &mut context.description.operation.parameters;
        let exists = parameters
            .iter()
            .any(|p| p.kind == ParameterKind::Header && p.name.eq_ignore_ascii_case(&self.name));
        if !exists {
            let mut header = Parameter::new(
                self.name.clone(),
                ParameterKind::Header,
                json!({ "type": "string" }),
            );
            header.variable_name = crate::materialize::parameters::variable_name(&self.name);
            header.is_required = true;
            header.description = self.description.clone();
            parameters.push(header);
        }
        Ok(true)
    }
}

/// Marks the operation deprecated.
pub struct DeprecateProcessor;

impl OperationProcessor for DeprecateProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        context.description.operation.is_deprecated = true;
        Ok(true)
    }
}

/// Rejects the operation.
pub struct ExcludeProcessor;

impl OperationProcessor for ExcludeProcessor {
    fn process(&self, _context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        Ok(false)
    }
}

/// Adds one tag.
pub struct TagProcessor {
    tag: String,
}

impl TagProcessor {
    /// Creates the processor.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Builds the processor from attribute arguments.
    pub fn from_arguments(arguments: &[Value]) -> AppResult<Self> {
        arguments
            .first()
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
            .ok_or_else(|| AppError::Config("Processor 'tag' needs a tag name".into()))
    }
}

impl OperationProcessor for TagProcessor {
    fn process(&self, context: &mut OperationProcessorContext<'_>) -> AppResult<bool> {
        let tags = &mut context.description.operation.tags;
        if !tags.contains(&self.tag) {
            tags.push(self.tag.clone());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use super::*;
    use crate::descriptor::{ActionDescriptor, ControllerDescriptor, Documentation};
    use crate::model::Operation;
    use crate::settings::GeneratorSettings;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_filter() {
        let settings = GeneratorSettings::default().with_api_groups(vec!["v1".into()]);
        let controller = ControllerDescriptor::new("AController");
        let action = ActionDescriptor::new("Get");
        let op = Operation::default;

        let (accepted, _) = run(&ApiGroupFilterProcessor, &settings, &controller, &action, op(), Some("v1"));
        assert!(accepted);
        let (accepted, _) = run(&ApiGroupFilterProcessor, &settings, &controller, &action, op(), Some("v2"));
        assert!(!accepted);
        let (accepted, _) = run(&ApiGroupFilterProcessor, &settings, &controller, &action, op(), None);
        assert!(!accepted);

        let all = GeneratorSettings::default();
        let (accepted, _) = run(&ApiGroupFilterProcessor, &all, &controller, &action, op(), None);
        assert!(accepted);
    }

    #[test]
    fn test_summary_prefers_attributes() {
        let settings = GeneratorSettings::default();
        let controller = ControllerDescriptor::new("AController");
        let mut action = ActionDescriptor::new("Get").with_attribute(Attribute::Summary {
            text: "From attribute".into(),
        });
        action.docs = Some(Documentation {
            summary: Some("From docs".into()),
            remarks: Some("  Longer text \n".into()),
            ..Default::default()
        });
        let (_, description) = run(
            &OperationSummaryProcessor,
            &settings,
            &controller,
            &action,
            Operation::default(),
            None,
        );
        assert_eq!(description.operation.summary.as_deref(), Some("From attribute"));
        assert_eq!(description.operation.description.as_deref(), Some("Longer text"));
    }

    #[test]
    fn test_tags_fall_back_to_controller_name() {
        let settings = GeneratorSettings::default();
        let plain = ControllerDescriptor::new("PersonsController");
        let action = ActionDescriptor::new("Get");
        let (_, description) =
            run(&OperationTagsProcessor, &settings, &plain, &action, Operation::default(), None);
        assert_eq!(description.operation.tags, vec!["Persons"]);

        let tagged = plain.clone().with_attribute(Attribute::Tags {
            tags: vec!["People".into()],
        });
        let (_, description) =
            run(&OperationTagsProcessor, &settings, &tagged, &action, Operation::default(), None);
        assert_eq!(description.operation.tags, vec!["People"]);

        let own = action.with_attribute(Attribute::Tags {
            tags: vec!["Admin".into(), "People".into()],
        });
        let (_, description) =
            run(&OperationTagsProcessor, &settings, &tagged, &own, Operation::default(), None);
        assert_eq!(description.operation.tags, vec!["Admin", "People"]);
    }

    #[test]
    fn test_extension_data_action_wins() {
        let settings = GeneratorSettings::default();
        let controller = ControllerDescriptor::new("AController").with_attribute(
            Attribute::ExtensionData {
                key: "owner".into(),
                value: json!("team-a"),
            },
        );
        let action = ActionDescriptor::new("Get").with_attribute(Attribute::ExtensionData {
            key: "x-owner".into(),
            value: json!("team-b"),
        });
        let (_, description) = run(
            &OperationExtensionDataProcessor,
            &settings,
            &controller,
            &action,
            Operation::default(),
            None,
        );
        assert_eq!(description.operation.extension_data["x-owner"], json!("team-b"));
    }

    #[test]
    fn test_require_header_is_added_once() {
        let settings = GeneratorSettings::default();
        let controller = ControllerDescriptor::new("AController");
        let action = ActionDescriptor::new("Get");
        let processor =
            RequireHeaderProcessor::from_arguments(&[json!("X-Tenant-Id"), json!("Tenant")]).unwrap();

        let (_, first) = run(&processor, &settings, &controller, &action, Operation::default(), None);
        let header = &first.operation.parameters[0];
        assert_eq!(header.name, "X-Tenant-Id");
        assert_eq!(header.variable_name, "xTenantId");
        assert!(header.is_required);

        let (_, second) = run(&processor, &settings, &controller, &action, first.operation, None);
        assert_eq!(second.operation.parameters.len(), 1);

        assert!(RequireHeaderProcessor::from_arguments(&[]).is_err());
    }

    #[test]
    fn test_parameter_documentation_fills_gaps() {
        let settings = GeneratorSettings::default();
        let controller = ControllerDescriptor::new("AController");
        let mut action = ActionDescriptor::new("Get");
        action.docs = Some(Documentation {
            params: [("filter".to_string(), "Name filter".to_string())]
                .into_iter()
                .collect(),
            ..Default::default()
        });
        let mut param = Parameter::new("q", ParameterKind::Query, json!({ "type": "string" }));
        param.original_name = "filter".into();
        let operation = Operation {
            parameters: vec![param],
            ..Default::default()
        };
        let (_, description) = run(
            &ParameterDocumentationProcessor,
            &settings,
            &controller,
            &action,
            operation,
            None,
        );
        assert_eq!(
            description.operation.parameters[0].description.as_deref(),
            Some("Name filter")
        );
    }
}
