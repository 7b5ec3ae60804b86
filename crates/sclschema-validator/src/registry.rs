//! Name-keyed schema cache with an explicit two-phase build.
//!
//! Phase one collects class schemas and enumerations; phase two
//! ([`SchemaRegistryBuilder::build`]) runs every schema-authoring check once
//! and produces an immutable [`SchemaRegistry`]. All subsequent validation
//! runs share the registry read-only, so concurrent validations of
//! different documents never contend on schema-level state.

use indexmap::IndexMap;
use tracing::debug;

use sclschema_core::{
    ClassSchema, EnumerationSpec, PresenceCondition,
};

use crate::{Diagnostic, Severity};

/// Immutable, name-keyed lookup of built schema classes and enumerations.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    classes: IndexMap<String, ClassSchema>,
    enums: IndexMap<String, EnumerationSpec>,
}

impl SchemaRegistry {
    /// Start a builder for the two-phase construction.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Look up a class schema by name.
    pub fn class(&self, name: &str) -> Option<&ClassSchema> {
        self.classes.get(name)
    }

    /// Look up an enumeration by name.
    pub fn enumeration(&self, name: &str) -> Option<&EnumerationSpec> {
        self.enums.get(name)
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of registered enumerations.
    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// The inheritance chain for a class, starting at the class itself and
    /// walking `parent` links. A repeated name ends the walk; the chain is
    /// assumed acyclic and this guard only prevents an infinite loop.
    pub fn inheritance_chain<'a>(&'a self, schema: &'a ClassSchema) -> Vec<&'a ClassSchema> {
        let mut chain = vec![schema];
        let mut seen = vec![schema.name.as_str()];
        let mut current = schema;
        while let Some(parent_name) = current.parent.as_deref() {
            if seen.contains(&parent_name) {
                break;
            }
            match self.class(parent_name) {
                Some(parent) => {
                    chain.push(parent);
                    seen.push(parent_name);
                    current = parent;
                }
                None => break,
            }
        }
        chain
    }

    /// Find a slot declared on a class or any of its ancestors, together
    /// with the schema that declares it.
    pub fn find_slot<'a>(
        &'a self,
        schema: &'a ClassSchema,
        slot_name: &str,
    ) -> Option<(&'a ClassSchema, &'a sclschema_core::SlotSpec)> {
        self.inheritance_chain(schema)
            .into_iter()
            .find_map(|s| s.slot(slot_name).map(|spec| (s, spec)))
    }

    /// The ordinal an enumeration declares for a literal, consulting the
    /// inheritance chain when the literal is not locally declared.
    pub fn enum_ordinal(&self, spec: &EnumerationSpec, literal: &str) -> Option<i32> {
        let mut seen = vec![spec.name.as_str()];
        let mut current = spec;
        loop {
            if let Some(ord) = current.local_ordinal(literal) {
                return Some(ord);
            }
            let parent_name = current.inherited_from.as_deref()?;
            if seen.contains(&parent_name) {
                return None;
            }
            current = self.enumeration(parent_name)?;
            seen.push(parent_name);
        }
    }
}

/// Collects schema classes and enumerations, then performs every
/// schema-authoring check in one [`build`](SchemaRegistryBuilder::build)
/// pass. Authoring defects are warnings: the offending construct is
/// degraded (condition to `Optional`, broken links cleared) and setup
/// continues.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    classes: IndexMap<String, ClassSchema>,
    enums: IndexMap<String, EnumerationSpec>,
    diagnostics: Vec<Diagnostic>,
}

impl SchemaRegistryBuilder {
    /// Register a class schema. Re-registering a name keeps the first
    /// definition and records a warning.
    pub fn add_class(&mut self, schema: ClassSchema) -> &mut Self {
        if self.classes.contains_key(&schema.name) {
            self.diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                code: "duplicate-class".to_string(),
                message: format!(
                    "class '{}' registered more than once; keeping the first definition",
                    schema.name
                ),
                element: schema.name.clone(),
                location: None,
            });
            return self;
        }
        self.classes.insert(schema.name.clone(), schema);
        self
    }

    /// Register an enumeration. Re-registering a name keeps the first
    /// definition and records a warning.
    pub fn add_enum(&mut self, spec: EnumerationSpec) -> &mut Self {
        if self.enums.contains_key(&spec.name) {
            self.diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                code: "duplicate-enum".to_string(),
                message: format!(
                    "enumeration '{}' registered more than once; keeping the first definition",
                    spec.name
                ),
                element: spec.name.clone(),
                location: None,
            });
            return self;
        }
        self.enums.insert(spec.name.clone(), spec);
        self
    }

    /// Record a build diagnostic discovered while loading schema input,
    /// e.g. a duplicate slot declaration the class constructor rejected.
    pub fn report(&mut self, diagnostic: Diagnostic) -> &mut Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Parse a raw `(code, args)` presence-condition pair for a slot being
    /// loaded. An unknown code or malformed argument records a warning and
    /// yields `Optional`, so loading never aborts on an authoring defect.
    pub fn parse_condition(
        &mut self,
        class: &str,
        slot: &str,
        code: &str,
        args: Option<&str>,
    ) -> PresenceCondition {
        match PresenceCondition::parse(code, args) {
            Ok(condition) => condition,
            Err(err) => {
                self.diagnostics.push(Diagnostic {
                    severity: Severity::Warning,
                    code: "bad-presence-condition".to_string(),
                    message: format!(
                        "slot '{}' of class '{}': {}; treating the slot as optional",
                        slot, class, err
                    ),
                    element: format!("{}.{}", class, slot),
                    location: None,
                });
                PresenceCondition::Optional
            }
        }
    }

    /// Run all build-time checks and freeze the registry.
    ///
    /// Checks: parent links resolve, sibling names in sibling-conditional
    /// rules resolve within the class or its ancestors, condition kinds are
    /// legal for the class's level, enumeration `inherited_from` links
    /// resolve. Each defect is reported once, here, and the construct is
    /// degraded so validation never re-reports it.
    pub fn build(mut self) -> (SchemaRegistry, Vec<Diagnostic>) {
        let mut diagnostics = std::mem::take(&mut self.diagnostics);

        // Parent links must resolve; a dangling link is cleared so the
        // chain walk stops cleanly.
        let class_names: Vec<String> = self.classes.keys().cloned().collect();
        for name in &class_names {
            let parent = self.classes[name].parent.clone();
            if let Some(parent_name) = parent {
                if !self.classes.contains_key(&parent_name) {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        code: "unresolved-parent".to_string(),
                        message: format!(
                            "class '{}' inherits from unknown class '{}'; inherited slots will not be checked",
                            name, parent_name
                        ),
                        element: name.clone(),
                        location: None,
                    });
                    self.classes[name].parent = None;
                }
            }
        }

        // Sibling names and level legality, per slot. Degraded slots fall
        // back to Optional so the engine never sees an unusable rule.
        for name in &class_names {
            let kind = self.classes[name].kind;
            let slot_names: Vec<String> = self.classes[name].slots.keys().cloned().collect();
            for slot_name in slot_names {
                let condition = self.classes[name].slots[&slot_name].presence.clone();

                if !kind.supports(&condition) {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        code: "condition-wrong-level".to_string(),
                        message: format!(
                            "slot '{}' of {} '{}' uses condition '{}', which is not applicable at this level; treating the slot as optional",
                            slot_name,
                            kind.label(),
                            name,
                            condition.code()
                        ),
                        element: format!("{}.{}", name, slot_name),
                        location: None,
                    });
                    self.classes[name].slots[&slot_name].presence = PresenceCondition::Optional;
                    continue;
                }

                if let Some(sibling) = condition.sibling() {
                    if !self.slot_known(name, sibling) {
                        diagnostics.push(Diagnostic {
                            severity: Severity::Warning,
                            code: "unresolved-sibling".to_string(),
                            message: format!(
                                "slot '{}' of class '{}' refers to unknown sibling '{}'; treating the slot as optional",
                                slot_name, name, sibling
                            ),
                            element: format!("{}.{}", name, slot_name),
                            location: None,
                        });
                        self.classes[name].slots[&slot_name].presence =
                            PresenceCondition::Optional;
                    }
                }
            }
        }

        // Enumeration inheritance links resolve, or the link is cleared.
        // This is the one place the defect is reported; lookups afterwards
        // simply stop at the end of the chain.
        let enum_names: Vec<String> = self.enums.keys().cloned().collect();
        for name in &enum_names {
            let parent = self.enums[name].inherited_from.clone();
            if let Some(parent_name) = parent {
                if !self.enums.contains_key(&parent_name) {
                    diagnostics.push(Diagnostic {
                        severity: Severity::Warning,
                        code: "unresolved-enum-parent".to_string(),
                        message: format!(
                            "enumeration '{}' inherits from unknown enumeration '{}'; proceeding without inherited literals",
                            name, parent_name
                        ),
                        element: name.clone(),
                        location: None,
                    });
                    self.enums[name].inherited_from = None;
                }
            }
        }

        debug!(
            classes = self.classes.len(),
            enums = self.enums.len(),
            warnings = diagnostics.len(),
            "schema registry built"
        );

        (
            SchemaRegistry {
                classes: self.classes,
                enums: self.enums,
            },
            diagnostics,
        )
    }

    /// Whether a slot name resolves on a class or any registered ancestor.
    fn slot_known(&self, class: &str, slot: &str) -> bool {
        let mut seen: Vec<&str> = Vec::new();
        let mut current = class;
        loop {
            let Some(schema) = self.classes.get(current) else {
                return false;
            };
            if schema.slots.contains_key(slot) {
                return true;
            }
            seen.push(current);
            match schema.parent.as_deref() {
                Some(parent) if !seen.contains(&parent) => current = parent,
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclschema_core::{ClassKind, SlotSpec};

    fn simple_class(name: &str, kind: ClassKind) -> ClassSchema {
        ClassSchema::new(name, kind)
    }

    #[test]
    fn test_two_phase_build() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(
            simple_class("SPS", ClassKind::Cdc)
                .with_slot(SlotSpec::new("stVal", PresenceCondition::Mandatory)),
        );
        let (registry, diagnostics) = builder.build();
        assert!(diagnostics.is_empty());
        assert_eq!(registry.class_count(), 1);
        assert!(registry.class("SPS").is_some());
    }

    #[test]
    fn test_duplicate_class_warns_and_keeps_first() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(
            simple_class("SPS", ClassKind::Cdc)
                .with_slot(SlotSpec::new("stVal", PresenceCondition::Mandatory)),
        );
        builder.add_class(simple_class("SPS", ClassKind::Cdc));
        let (registry, diagnostics) = builder.build();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "duplicate-class");
        assert!(registry.class("SPS").unwrap().slot("stVal").is_some());
    }

    #[test]
    fn test_unknown_condition_code_degrades_to_optional() {
        let mut builder = SchemaRegistry::builder();
        let condition = builder.parse_condition("SPS", "subVal", "MFsubst", None);
        assert_eq!(condition, PresenceCondition::Optional);
        let (_, diagnostics) = builder.build();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "bad-presence-condition");
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(diagnostics[0].message.contains("MFsubst"));
    }

    #[test]
    fn test_unresolved_parent_cleared() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(simple_class("XCBR", ClassKind::LnClass).with_parent("CommonLN"));
        let (registry, diagnostics) = builder.build();
        assert!(diagnostics.iter().any(|d| d.code == "unresolved-parent"));
        assert_eq!(registry.class("XCBR").unwrap().parent, None);
    }

    #[test]
    fn test_unresolved_sibling_degrades() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(simple_class("APC", ClassKind::Cdc).with_slot(SlotSpec::new(
            "ctlVal",
            PresenceCondition::MandatoryIfSiblingElseForbidden("noSuchSlot".to_string()),
        )));
        let (registry, diagnostics) = builder.build();
        assert!(diagnostics.iter().any(|d| d.code == "unresolved-sibling"));
        assert_eq!(
            registry.class("APC").unwrap().slot("ctlVal").unwrap().presence,
            PresenceCondition::Optional
        );
    }

    #[test]
    fn test_sibling_resolves_through_ancestor() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(
            simple_class("CommonLN", ClassKind::AbstractLnClass)
                .with_slot(SlotSpec::new("Mod", PresenceCondition::Mandatory)),
        );
        builder.add_class(
            simple_class("XCBR", ClassKind::LnClass)
                .with_parent("CommonLN")
                .with_slot(SlotSpec::new(
                    "BlkOpn",
                    PresenceCondition::MandatoryIfSiblingElseOptional("Mod".to_string()),
                )),
        );
        let (registry, diagnostics) = builder.build();
        assert!(diagnostics.is_empty());
        assert_eq!(
            registry.class("XCBR").unwrap().slot("BlkOpn").unwrap().presence,
            PresenceCondition::MandatoryIfSiblingElseOptional("Mod".to_string())
        );
    }

    #[test]
    fn test_condition_wrong_level_degrades() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(simple_class("SPS", ClassKind::Cdc).with_slot(SlotSpec::new(
            "stVal",
            PresenceCondition::MandatoryInLln0ElseOptional,
        )));
        let (registry, diagnostics) = builder.build();
        assert!(diagnostics.iter().any(|d| d.code == "condition-wrong-level"));
        assert_eq!(
            registry.class("SPS").unwrap().slot("stVal").unwrap().presence,
            PresenceCondition::Optional
        );
    }

    #[test]
    fn test_unresolved_enum_parent_warned_once_and_cleared() {
        let mut builder = SchemaRegistry::builder();
        builder.add_enum(
            EnumerationSpec::new("ctlModelKind")
                .with_parent("noSuchEnum")
                .with_literal("status-only", 0),
        );
        let (registry, diagnostics) = builder.build();
        let warnings: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code == "unresolved-enum-parent")
            .collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            registry.enumeration("ctlModelKind").unwrap().inherited_from,
            None
        );
        // Lookups proceed as if there were no parent.
        let spec = registry.enumeration("ctlModelKind").unwrap();
        assert_eq!(registry.enum_ordinal(spec, "status-only"), Some(0));
        assert_eq!(registry.enum_ordinal(spec, "direct-with-normal-security"), None);
    }

    #[test]
    fn test_inheritance_chain_and_find_slot() {
        let mut builder = SchemaRegistry::builder();
        builder.add_class(
            simple_class("CommonLN", ClassKind::AbstractLnClass)
                .with_slot(SlotSpec::new("Beh", PresenceCondition::Mandatory)),
        );
        builder.add_class(simple_class("XSWI", ClassKind::LnClass).with_parent("CommonLN"));
        let (registry, _) = builder.build();

        let xswi = registry.class("XSWI").unwrap();
        let chain = registry.inheritance_chain(xswi);
        assert_eq!(chain.len(), 2);

        let (declaring, slot) = registry.find_slot(xswi, "Beh").unwrap();
        assert_eq!(declaring.name, "CommonLN");
        assert_eq!(slot.name, "Beh");
        assert!(registry.find_slot(xswi, "NoSuch").is_none());
    }

    #[test]
    fn test_enum_ordinal_through_chain() {
        let mut builder = SchemaRegistry::builder();
        builder.add_enum(
            EnumerationSpec::new("OutputKind")
                .with_literal("pulse", 0)
                .with_literal("persistent", 1),
        );
        builder.add_enum(
            EnumerationSpec::new("ExtendedOutputKind")
                .with_parent("OutputKind")
                .with_literal("persistent-feedback", 2),
        );
        let (registry, _) = builder.build();
        let spec = registry.enumeration("ExtendedOutputKind").unwrap();
        assert_eq!(registry.enum_ordinal(spec, "persistent-feedback"), Some(2));
        assert_eq!(registry.enum_ordinal(spec, "pulse"), Some(0));
        assert_eq!(registry.enum_ordinal(spec, "unknown"), None);
    }
}
