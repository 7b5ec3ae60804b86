//! Structural validation: presence checks combined with value and
//! nested-structure checks, recursively, for every container level.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::trace;

use sclschema_core::{
    AmbientContext, BasicType, ChildValue, ContainerInstance, TypeRef,
};

use crate::{
    count_errors, BasicTypeValidator, Diagnostic, EnumerationValidator, PresenceValidator,
    SchemaRegistry, Severity, ValidationConfig, ValidationStats,
};

/// Mutable state scoped to one validation run (one document).
///
/// The visited set implements the "validate a shared nested instance only
/// once" rule: a DOType or DAType referenced by several parents produces its
/// diagnostics exactly once per run. The set dies with the run; it is never
/// carried across documents.
#[derive(Debug, Default)]
pub struct RunContext {
    visited: HashSet<usize>,
    /// Counters accumulated over the run.
    pub stats: ValidationStats,
}

impl RunContext {
    /// Fresh state for one validation run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a container as being validated. Returns false when it was
    /// already entered during this run.
    fn enter(&mut self, instance: &Rc<ContainerInstance>) -> bool {
        self.visited.insert(Rc::as_ptr(instance) as usize)
    }
}

/// Recursive validator for container instances at every nesting level.
pub struct StructuralValidator {
    presence: PresenceValidator,
    basic: BasicTypeValidator,
    enums: EnumerationValidator,
    config: ValidationConfig,
}

impl StructuralValidator {
    /// Create a structural validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            presence: PresenceValidator::new(),
            basic: BasicTypeValidator::new(),
            enums: EnumerationValidator::new(),
            config,
        }
    }

    /// Access the shared presence engine.
    pub fn presence(&self) -> &PresenceValidator {
        &self.presence
    }

    /// Access the enumeration validator.
    pub fn enumerations(&self) -> &EnumerationValidator {
        &self.enums
    }

    /// Validate one container instance and everything reachable from it.
    /// Returns whether no error-severity diagnostic was added.
    pub fn validate_container(
        &self,
        registry: &SchemaRegistry,
        instance: &Rc<ContainerInstance>,
        ambient: &dyn AmbientContext,
        ctx: &mut RunContext,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        self.validate_at_depth(registry, instance, ambient, ctx, 0, issues)
    }

    fn validate_at_depth(
        &self,
        registry: &SchemaRegistry,
        instance: &Rc<ContainerInstance>,
        ambient: &dyn AmbientContext,
        ctx: &mut RunContext,
        depth: usize,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        if depth >= self.config.max_depth {
            issues.push(Diagnostic {
                severity: Severity::Warning,
                code: "max-depth".to_string(),
                message: format!(
                    "recursion depth {} reached at class '{}'; subtree skipped",
                    depth, instance.class_name
                ),
                element: instance.class_name.clone(),
                location: Some(instance.location),
            });
            return true;
        }

        if !ctx.enter(instance) {
            // Shared instance, already validated this run.
            return true;
        }

        let errors_before = count_errors(issues);

        let Some(schema) = registry.class(&instance.class_name) else {
            issues.push(Diagnostic {
                severity: Severity::Warning,
                code: "unresolved-class".to_string(),
                message: format!(
                    "no schema class named '{}' is registered; subtree skipped",
                    instance.class_name
                ),
                element: instance.class_name.clone(),
                location: Some(instance.location),
            });
            return true;
        };

        trace!(class = %schema.name, depth, "structural validation");
        self.presence
            .check(registry, schema, instance, ambient, issues);
        ctx.stats.containers_validated += 1;

        let chain = registry.inheritance_chain(schema);
        for child in &instance.children {
            let (base, _) = self
                .presence
                .resolve_child(&chain, &child.name, child.instance_number);
            let Some(slot) = chain.iter().find_map(|s| s.slot(base)) else {
                // Unknown slot, already reported by the presence scan.
                continue;
            };
            ctx.stats.slots_checked += 1;

            let Some(type_ref) = &slot.value else {
                continue;
            };
            if !self.config.check_values {
                continue;
            }
            let element = format!("{}.{}", instance.class_name, child.name);

            match (&child.value, type_ref) {
                (ChildValue::Leaf(leaf), TypeRef::Basic(name)) => match BasicType::from_name(name)
                {
                    Some(basic_type) => {
                        self.basic
                            .validate_leaf(basic_type, leaf, &element, child.location, issues);
                        ctx.stats.values_validated += leaf.values.len();
                    }
                    None => {
                        issues.push(Diagnostic {
                            severity: Severity::Warning,
                            code: "unresolved-type".to_string(),
                            message: format!(
                                "slot '{}' of class '{}' references unknown basic type '{}'; values not checked",
                                base, schema.name, name
                            ),
                            element,
                            location: Some(child.location),
                        });
                    }
                },
                (ChildValue::Leaf(leaf), TypeRef::Enum(name)) => match registry.enumeration(name) {
                    Some(spec) => {
                        self.enums
                            .validate_leaf(registry, spec, leaf, &element, child.location, issues);
                        ctx.stats.values_validated += leaf.values.len();
                    }
                    None => {
                        issues.push(Diagnostic {
                            severity: Severity::Warning,
                            code: "unresolved-type".to_string(),
                            message: format!(
                                "slot '{}' of class '{}' references unknown enumeration '{}'; values not checked",
                                base, schema.name, name
                            ),
                            element,
                            location: Some(child.location),
                        });
                    }
                },
                (ChildValue::Leaf(_), TypeRef::Constructed(name) | TypeRef::Nested(name)) => {
                    issues.push(Diagnostic {
                        severity: Severity::Error,
                        code: "structure-mismatch".to_string(),
                        message: format!(
                            "slot '{}' of class '{}' declares nested type '{}', but the instance supplies a leaf value",
                            base, schema.name, name
                        ),
                        element,
                        location: Some(child.location),
                    });
                }
                (
                    ChildValue::Nested(nested),
                    TypeRef::Constructed(name) | TypeRef::Nested(name),
                ) => {
                    if &nested.class_name != name {
                        issues.push(Diagnostic {
                            severity: Severity::Error,
                            code: "nested-class-mismatch".to_string(),
                            message: format!(
                                "slot '{}' of class '{}' declares nested type '{}', but the instance is of class '{}'",
                                base, schema.name, name, nested.class_name
                            ),
                            element: element.clone(),
                            location: Some(child.location),
                        });
                    }
                    self.validate_at_depth(registry, nested, ambient, ctx, depth + 1, issues);
                }
                (ChildValue::Nested(_), TypeRef::Basic(_) | TypeRef::Enum(_)) => {
                    issues.push(Diagnostic {
                        severity: Severity::Error,
                        code: "structure-mismatch".to_string(),
                        message: format!(
                            "slot '{}' of class '{}' declares leaf type '{}', but the instance supplies a nested structure",
                            base,
                            schema.name,
                            type_ref.type_name()
                        ),
                        element,
                        location: Some(child.location),
                    });
                }
            }
        }

        count_errors(issues) == errors_before
    }
}
