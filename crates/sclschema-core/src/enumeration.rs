//! Enumeration definitions from the namespace schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named enumeration: literal-to-ordinal pairs plus an optional
/// single-inheritance parent resolved by name through the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationSpec {
    /// The enumeration name, unique within its registry.
    pub name: String,

    /// Declared literals, in declaration order, keyed by literal text.
    pub literals: IndexMap<String, i32>,

    /// Name of the enumeration this one inherits literals from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

impl EnumerationSpec {
    /// Create an empty enumeration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            literals: IndexMap::new(),
            inherited_from: None,
        }
    }

    /// Set the parent enumeration name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.inherited_from = Some(parent.into());
        self
    }

    /// Register a literal/ordinal pair. Re-declaring a literal within one
    /// enumeration is a schema-authoring error.
    pub fn add_literal(&mut self, literal: impl Into<String>, ordinal: i32) -> Result<()> {
        let literal = literal.into();
        if self.literals.contains_key(&literal) {
            return Err(Error::DuplicateLiteral {
                enumeration: self.name.clone(),
                literal,
            });
        }
        self.literals.insert(literal, ordinal);
        Ok(())
    }

    /// Builder-style [`EnumerationSpec::add_literal`] that panics on
    /// duplicates; intended for statically-known enumerations in tests.
    pub fn with_literal(mut self, literal: impl Into<String>, ordinal: i32) -> Self {
        self.add_literal(literal, ordinal)
            .expect("duplicate literal in literal enumeration");
        self
    }

    /// The ordinal declared locally for a literal, ignoring inheritance.
    pub fn local_ordinal(&self, literal: &str) -> Option<i32> {
        self.literals.get(literal).copied()
    }
}
