//! Enumeration validation: literal membership and ordinal agreement.

use sclschema_core::{EnumDefInstance, EnumerationSpec, LeafValue, SourceLocation};

use crate::{count_errors, Diagnostic, SchemaRegistry, Severity};

/// Validator for enumerated attribute values and explicit enumerated-type
/// definitions. Inherited literals are resolved through the registry's
/// single-inheritance chain; an unresolvable parent was already reported
/// once at registry build time, so lookups here simply stop at the end of
/// the chain.
pub struct EnumerationValidator;

impl EnumerationValidator {
    /// Create a new enumeration validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a leaf occurrence against the enumeration its slot declares:
    /// the declared value-kind tag must be `Enum`, the declared type name
    /// must match, and every assigned literal must be known to the
    /// enumeration or its parent chain.
    pub fn validate_leaf(
        &self,
        registry: &SchemaRegistry,
        spec: &EnumerationSpec,
        leaf: &LeafValue,
        element: &str,
        location: SourceLocation,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        let errors_before = count_errors(issues);

        if leaf.btype != "Enum" {
            issues.push(Diagnostic {
                severity: Severity::Error,
                code: "type-mismatch".to_string(),
                message: format!(
                    "attribute '{}' declares value kind '{}', but the schema requires enumeration '{}'",
                    element, leaf.btype, spec.name
                ),
                element: element.to_string(),
                location: Some(location),
            });
        } else if leaf.type_name.as_deref() != Some(spec.name.as_str()) {
            issues.push(Diagnostic {
                severity: Severity::Error,
                code: "type-mismatch".to_string(),
                message: format!(
                    "attribute '{}' declares enumeration type '{}', but the schema requires '{}'",
                    element,
                    leaf.type_name.as_deref().unwrap_or("<none>"),
                    spec.name
                ),
                element: element.to_string(),
                location: Some(location),
            });
        }

        for literal in &leaf.values {
            if registry.enum_ordinal(spec, literal).is_none() {
                issues.push(Diagnostic {
                    severity: Severity::Error,
                    code: "unknown-literal".to_string(),
                    message: format!(
                        "'{}' is not a literal of enumeration '{}' or its parents",
                        literal, spec.name
                    ),
                    element: element.to_string(),
                    location: Some(location),
                });
            }
        }

        count_errors(issues) == errors_before
    }

    /// Validate an explicit enumerated-type definition: every declared
    /// literal/ordinal pair must agree with the schema enumeration,
    /// consulting the parent chain for literals not locally declared.
    pub fn validate_definition(
        &self,
        registry: &SchemaRegistry,
        spec: &EnumerationSpec,
        definition: &EnumDefInstance,
        issues: &mut Vec<Diagnostic>,
    ) -> bool {
        let errors_before = count_errors(issues);

        for pair in &definition.values {
            let element = format!("{}.{}", definition.id, pair.literal);
            match registry.enum_ordinal(spec, &pair.literal) {
                None => {
                    issues.push(Diagnostic {
                        severity: Severity::Error,
                        code: "unknown-literal".to_string(),
                        message: format!(
                            "'{}' is not a literal of enumeration '{}' or its parents",
                            pair.literal, spec.name
                        ),
                        element,
                        location: Some(pair.location),
                    });
                }
                Some(declared) if declared != pair.ord => {
                    issues.push(Diagnostic {
                        severity: Severity::Error,
                        code: "ordinal-mismatch".to_string(),
                        message: format!(
                            "literal '{}' of enumeration '{}' is declared with ordinal {}, but '{}' assigns ordinal {}",
                            pair.literal, spec.name, declared, definition.id, pair.ord
                        ),
                        element,
                        location: Some(pair.location),
                    });
                }
                Some(_) => {}
            }
        }

        count_errors(issues) == errors_before
    }
}

impl Default for EnumerationValidator {
    fn default() -> Self {
        Self::new()
    }
}
