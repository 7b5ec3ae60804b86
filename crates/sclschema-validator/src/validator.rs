//! Main validation entry points.

use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use sclschema_core::{AmbientContext, AmbientFacts, ContainerInstance, EnumDefInstance};

use crate::{
    error::{ValidationError, ValidationResult},
    Diagnostic, DiagnosticSink, RunContext, SchemaRegistry, Severity, StructuralValidator,
    ValidationConfig, ValidationOutcome,
};

/// One top-level container of a document, paired with the ambient facts the
/// loader derived for it.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    /// The container instance to validate.
    pub instance: Rc<ContainerInstance>,
    /// Ambient facts for the context-dependent presence conditions.
    pub ambient: AmbientFacts,
}

/// An instance document: the top-level containers and explicit
/// enumerated-type definitions one SCL file supplies.
#[derive(Debug, Clone, Default)]
pub struct InstanceDocument {
    /// Top-level containers, in document order.
    pub containers: Vec<DocumentEntry>,
    /// Explicit enumerated-type definitions, in document order.
    pub enum_defs: Vec<EnumDefInstance>,
}

impl InstanceDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level container with its ambient facts.
    pub fn add_container(&mut self, instance: Rc<ContainerInstance>, ambient: AmbientFacts) {
        self.containers.push(DocumentEntry { instance, ambient });
    }

    /// Append an enumerated-type definition.
    pub fn add_enum_def(&mut self, definition: EnumDefInstance) {
        self.enum_defs.push(definition);
    }
}

/// The validation engine: an immutable schema registry plus the per-level
/// validators. All per-run state lives in a [`RunContext`] created inside
/// each call, so one `Validator` can serve any number of documents, and the
/// registry can back concurrent runs.
pub struct Validator {
    registry: SchemaRegistry,
    structural: StructuralValidator,
}

impl Validator {
    /// Create a validator with default configuration.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self::with_config(registry, ValidationConfig::default())
    }

    /// Create a validator with custom configuration.
    pub fn with_config(registry: SchemaRegistry, config: ValidationConfig) -> Self {
        Self {
            registry,
            structural: StructuralValidator::new(config),
        }
    }

    /// The schema registry backing this validator.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate one container instance tree with the given ambient context.
    pub fn validate_container(
        &self,
        instance: &Rc<ContainerInstance>,
        ambient: &dyn AmbientContext,
    ) -> ValidationOutcome {
        let start = Instant::now();
        let mut ctx = RunContext::new();
        let mut issues = Vec::new();
        self.structural
            .validate_container(&self.registry, instance, ambient, &mut ctx, &mut issues);
        ctx.stats.duration_ms = start.elapsed().as_millis() as u64;
        ValidationOutcome::from_diagnostics(issues, ctx.stats)
    }

    /// Validate a container against an explicitly named entry class.
    ///
    /// Unlike [`Validator::validate_container`], which trusts the
    /// instance's own class name, this fails with
    /// [`ValidationError::SchemaNotFound`] when the named class is not
    /// registered, and reports a class mismatch as an error diagnostic.
    pub fn validate_against(
        &self,
        class_name: &str,
        instance: &Rc<ContainerInstance>,
        ambient: &dyn AmbientContext,
    ) -> ValidationResult<ValidationOutcome> {
        if self.registry.class(class_name).is_none() {
            return Err(ValidationError::schema_not_found(class_name));
        }
        if instance.class_name != class_name {
            let diagnostic = Diagnostic {
                severity: Severity::Error,
                code: "class-mismatch".to_string(),
                message: format!(
                    "instance of class '{}' cannot be validated against class '{}'",
                    instance.class_name, class_name
                ),
                element: instance.class_name.clone(),
                location: Some(instance.location),
            };
            return Ok(ValidationOutcome::from_diagnostics(
                vec![diagnostic],
                Default::default(),
            ));
        }
        Ok(self.validate_container(instance, ambient))
    }

    /// Validate one explicit enumerated-type definition.
    pub fn validate_enum_def(&self, definition: &EnumDefInstance) -> ValidationOutcome {
        let mut issues = Vec::new();
        let mut ctx = RunContext::new();
        self.check_enum_def(definition, &mut ctx, &mut issues);
        ValidationOutcome::from_diagnostics(issues, ctx.stats)
    }

    /// Validate a whole document in one run: every top-level container, then
    /// every enumerated-type definition. Shared nested instances are
    /// deduplicated across the entire document.
    pub fn validate_document(&self, document: &InstanceDocument) -> ValidationOutcome {
        let start = Instant::now();
        let mut ctx = RunContext::new();
        let mut issues = Vec::new();

        for entry in &document.containers {
            self.structural.validate_container(
                &self.registry,
                &entry.instance,
                &entry.ambient,
                &mut ctx,
                &mut issues,
            );
        }
        for definition in &document.enum_defs {
            self.check_enum_def(definition, &mut ctx, &mut issues);
        }

        ctx.stats.duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            containers = ctx.stats.containers_validated,
            diagnostics = issues.len(),
            "document validated"
        );
        ValidationOutcome::from_diagnostics(issues, ctx.stats)
    }

    /// Validate a document, streaming diagnostics into a sink in emission
    /// order. Returns the overall verdict.
    pub fn validate_document_into(
        &self,
        document: &InstanceDocument,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        let outcome = self.validate_document(document);
        let success = outcome.success;
        for diagnostic in outcome.diagnostics {
            sink.report(diagnostic);
        }
        success
    }

    fn check_enum_def(
        &self,
        definition: &EnumDefInstance,
        ctx: &mut RunContext,
        issues: &mut Vec<Diagnostic>,
    ) {
        match self.registry.enumeration(&definition.enum_name) {
            Some(spec) => {
                self.structural.enumerations().validate_definition(
                    &self.registry,
                    spec,
                    definition,
                    issues,
                );
            }
            None => {
                issues.push(Diagnostic {
                    severity: Severity::Warning,
                    code: "unresolved-type".to_string(),
                    message: format!(
                        "'{}' references unknown enumeration '{}'; definition not checked",
                        definition.id, definition.enum_name
                    ),
                    element: definition.id.clone(),
                    location: Some(definition.location),
                });
            }
        }
        ctx.stats.enum_defs_validated += 1;
    }
}
