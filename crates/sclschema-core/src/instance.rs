//! Instance-side model: the containers and leaf values one SCL document
//! supplies for validation.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Line/column position of an element in the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based line number; 0 when unknown.
    pub line: u32,
    /// 1-based column number; 0 when unknown.
    pub column: u32,
}

impl SourceLocation {
    /// Create a location from line and column.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A leaf attribute occurrence: the declared value-kind tag, the declared
/// type name for enumerated/structured kinds, and the raw string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafValue {
    /// The declared value-kind tag: a basic type name, `Enum`, or `Struct`.
    pub btype: String,
    /// The declared type name, present for `Enum` and `Struct` kinds.
    pub type_name: Option<String>,
    /// Raw string values assigned to the attribute, in document order.
    pub values: Vec<String>,
}

impl LeafValue {
    /// A leaf declared with a basic type tag.
    pub fn basic(btype: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            btype: btype.into(),
            type_name: None,
            values,
        }
    }

    /// A leaf declared as `Enum` with the given enumeration name.
    pub fn enumerated(type_name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            btype: "Enum".to_string(),
            type_name: Some(type_name.into()),
            values,
        }
    }
}

/// The content of one child occurrence: a leaf value list, or a reference to
/// a nested container instance.
///
/// Nested containers are shared by reference: when several parents point at
/// the same type definition, they hold clones of one `Rc`, and that shared
/// identity is what the validator's per-run memoization keys on.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildValue {
    /// A leaf attribute with raw string values.
    Leaf(LeafValue),
    /// A nested container, shared by reference.
    Nested(Rc<ContainerInstance>),
}

/// One child occurrence inside a container instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildInstance {
    /// The slot name as written in the document, possibly carrying a
    /// numeric instance suffix (`Ind1`, `Ind2`, ...).
    pub name: String,
    /// Explicit instance number, when the loader carries one separately
    /// from the name. The engine otherwise derives it from the name suffix.
    pub instance_number: Option<u32>,
    /// The occurrence's content.
    pub value: ChildValue,
    /// Where the occurrence appears in the source document.
    pub location: SourceLocation,
}

impl ChildInstance {
    /// A leaf child occurrence.
    pub fn leaf(name: impl Into<String>, value: LeafValue, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            instance_number: None,
            value: ChildValue::Leaf(value),
            location,
        }
    }

    /// A nested child occurrence sharing the given container.
    pub fn nested(
        name: impl Into<String>,
        container: Rc<ContainerInstance>,
        location: SourceLocation,
    ) -> Self {
        Self {
            name: name.into(),
            instance_number: None,
            value: ChildValue::Nested(container),
            location,
        }
    }

    /// Attach an explicit instance number.
    pub fn numbered(mut self, number: u32) -> Self {
        self.instance_number = Some(number);
        self
    }
}

/// A container occurrence: an LNodeType, DOType, or DAType instance with its
/// concrete children.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerInstance {
    /// Name of the schema class this container claims to instantiate.
    pub class_name: String,
    /// Child occurrences in document order.
    pub children: Vec<ChildInstance>,
    /// Where the container appears in the source document.
    pub location: SourceLocation,
}

impl ContainerInstance {
    /// Create a container instance.
    pub fn new(
        class_name: impl Into<String>,
        children: Vec<ChildInstance>,
        location: SourceLocation,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            children,
            location,
        }
    }

    /// Create a container wrapped for shared referencing.
    pub fn shared(
        class_name: impl Into<String>,
        children: Vec<ChildInstance>,
        location: SourceLocation,
    ) -> Rc<Self> {
        Rc::new(Self::new(class_name, children, location))
    }
}

/// One literal/ordinal pair inside an explicit enumerated-type definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLiteralDef {
    /// The literal text.
    pub literal: String,
    /// The ordinal the definition assigns to the literal.
    pub ord: i32,
    /// Where the pair appears in the source document.
    pub location: SourceLocation,
}

/// An explicit enumerated-type definition occurrence (an `EnumType` in SCL
/// terms): a concrete list of literal/ordinal pairs claiming to instantiate
/// a named schema enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDefInstance {
    /// The definition's own identifier in the document.
    pub id: String,
    /// Name of the schema enumeration this definition claims to match.
    pub enum_name: String,
    /// The declared literal/ordinal pairs, in document order.
    pub values: Vec<EnumLiteralDef>,
    /// Where the definition appears in the source document.
    pub location: SourceLocation,
}
