//! Slot declarations and value-domain references.

use serde::{Deserialize, Serialize};

use crate::PresenceCondition;

/// The value domain a slot's content is drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    /// A built-in basic type, referenced by its standard name.
    Basic(String),
    /// A named enumeration.
    Enum(String),
    /// A named constructed attribute class (nested sub-attributes).
    Constructed(String),
    /// A nested object class - a CDC for a data object slot.
    Nested(String),
}

impl TypeRef {
    /// The referenced type name, whatever the domain.
    pub fn type_name(&self) -> &str {
        match self {
            TypeRef::Basic(n) | TypeRef::Enum(n) | TypeRef::Constructed(n) | TypeRef::Nested(n) => {
                n
            }
        }
    }

    /// Whether this reference points at a structured (non-leaf) domain.
    pub fn is_structured(&self) -> bool {
        matches!(self, TypeRef::Constructed(_) | TypeRef::Nested(_))
    }
}

/// One declared child slot of a class: a data object, data attribute, or
/// sub-data-attribute, depending on the owning class's level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// The slot name, unique within the owning class's own slot list.
    pub name: String,

    /// The presence condition governing occurrences of this slot.
    pub presence: PresenceCondition,

    /// The slot's value domain. `None` for slots whose type the schema
    /// document leaves unspecified (the structural validator then checks
    /// presence only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<TypeRef>,
}

impl SlotSpec {
    /// Create a slot with no declared value domain.
    pub fn new(name: impl Into<String>, presence: PresenceCondition) -> Self {
        Self {
            name: name.into(),
            presence,
            value: None,
        }
    }

    /// Create a slot with a declared value domain.
    pub fn typed(
        name: impl Into<String>,
        presence: PresenceCondition,
        value: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            presence,
            value: Some(value),
        }
    }
}
