//! # SCLSchema Core
//!
//! Core data structures and types for IEC 61850 NSD schema validation.
//!
//! This crate provides the fundamental data structures for representing a
//! namespace schema (classes, slots, presence conditions, basic types,
//! enumerations) and the instance-side model a loader produces from an SCL
//! document (containers, child occurrences, leaf values).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ambient;
pub mod basic;
pub mod enumeration;
pub mod error;
pub mod instance;
pub mod presence;
pub mod schema;
pub mod slot;

pub use ambient::{AmbientContext, AmbientFacts, NoAmbient, LLN0};
pub use basic::BasicType;
pub use enumeration::EnumerationSpec;
pub use error::{Error, Result};
pub use instance::{
    ChildInstance, ChildValue, ContainerInstance, EnumDefInstance, EnumLiteralDef, LeafValue,
    SourceLocation,
};
pub use presence::{ConditionParseError, PresenceCondition};
pub use schema::{ClassKind, ClassSchema};
pub use slot::{SlotSpec, TypeRef};

/// The namespace schema revision this crate's condition vocabulary tracks.
pub const NSD_REVISION: &str = "IEC 61850-7-x:2007B4";
