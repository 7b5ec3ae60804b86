//! Class schemas: CDCs, constructed attribute classes, and LN classes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, PresenceCondition, Result, SlotSpec};

/// The nesting level a class schema describes. Levels share one generic
/// presence-condition engine; the kind only determines which condition
/// vocabulary is legal, checked once at schema-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassKind {
    /// A Common Data Class: data attributes under a data object.
    Cdc,
    /// A constructed attribute class: sub-data-attributes under a data
    /// attribute.
    ConstructedAttribute,
    /// A logical node class: data objects under a logical node.
    LnClass,
    /// An abstract logical node class, usable only as a `parent`.
    AbstractLnClass,
}

impl ClassKind {
    /// Whether a condition kind is meaningful for slots at this level.
    ///
    /// The ambient-context conditions query the containing logical node and
    /// logical device, so they only make sense for data object slots of a
    /// logical node class.
    pub fn supports(&self, condition: &PresenceCondition) -> bool {
        if condition.needs_ambient() {
            matches!(self, ClassKind::LnClass | ClassKind::AbstractLnClass)
        } else {
            true
        }
    }

    /// A short label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ClassKind::Cdc => "CDC",
            ClassKind::ConstructedAttribute => "constructed attribute",
            ClassKind::LnClass => "LN class",
            ClassKind::AbstractLnClass => "abstract LN class",
        }
    }
}

/// A named schema class: the declared slots of a CDC, a constructed
/// attribute class, or an LN class, plus an optional single-inheritance
/// parent resolved by name through the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSchema {
    /// The class name, unique within its registry.
    pub name: String,

    /// The nesting level this class describes.
    pub kind: ClassKind,

    /// Declared slots, in declaration order, keyed by slot name.
    pub slots: IndexMap<String, SlotSpec>,

    /// Name of the parent class, if this class inherits one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ClassSchema {
    /// Create an empty class schema.
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            slots: IndexMap::new(),
            parent: None,
        }
    }

    /// Set the parent class name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Register a declared slot. Duplicate slot names within one class are a
    /// schema-authoring error, caught here at build time.
    pub fn add_slot(&mut self, slot: SlotSpec) -> Result<()> {
        if self.slots.contains_key(&slot.name) {
            return Err(Error::DuplicateSlot {
                class: self.name.clone(),
                slot: slot.name,
            });
        }
        self.slots.insert(slot.name.clone(), slot);
        Ok(())
    }

    /// Builder-style [`ClassSchema::add_slot`] that panics on duplicates;
    /// intended for statically-known schemas in tests.
    pub fn with_slot(mut self, slot: SlotSpec) -> Self {
        self.add_slot(slot).expect("duplicate slot in literal schema");
        self
    }

    /// Look up a slot declared directly on this class.
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRef;

    #[test]
    fn test_duplicate_slot_rejected() {
        let mut schema = ClassSchema::new("SPS", ClassKind::Cdc);
        schema
            .add_slot(SlotSpec::new("stVal", PresenceCondition::Mandatory))
            .unwrap();
        let err = schema
            .add_slot(SlotSpec::new("stVal", PresenceCondition::Optional))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSlot { .. }));
        assert!(err.to_string().contains("stVal"));
    }

    #[test]
    fn test_slot_order_preserved() {
        let schema = ClassSchema::new("MV", ClassKind::Cdc)
            .with_slot(SlotSpec::new("mag", PresenceCondition::Mandatory))
            .with_slot(SlotSpec::new("q", PresenceCondition::Mandatory))
            .with_slot(SlotSpec::new("t", PresenceCondition::Mandatory));
        let names: Vec<_> = schema.slots.keys().cloned().collect();
        assert_eq!(names, vec!["mag", "q", "t"]);
    }

    #[test]
    fn test_kind_supports() {
        let lln0_rule = PresenceCondition::MandatoryInLln0ElseOptional;
        assert!(ClassKind::LnClass.supports(&lln0_rule));
        assert!(!ClassKind::Cdc.supports(&lln0_rule));
        assert!(ClassKind::Cdc.supports(&PresenceCondition::Mandatory));
    }

    #[test]
    fn test_serde_round_trip() {
        let schema = ClassSchema::new("ENS", ClassKind::Cdc)
            .with_parent("BasePrimitiveCDC")
            .with_slot(SlotSpec::typed(
                "stVal",
                PresenceCondition::Mandatory,
                TypeRef::Enum("BehaviourModeKind".to_string()),
            ));
        let json = serde_json::to_string(&schema).unwrap();
        let back: ClassSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
