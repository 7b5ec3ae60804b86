//! Loading schema and instance documents from JSON/YAML files into the
//! in-memory model.
//!
//! The schema file carries classes (with raw presence-condition codes) and
//! enumerations. The instance file carries a table of type definitions that
//! reference each other by id, so a type shared by several parents loads as
//! one shared allocation, plus the list of top-level containers with their
//! ambient facts and any explicit enumerated-type definitions.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use sclschema_core::{
    AmbientFacts, ChildInstance, ClassKind, ClassSchema, ContainerInstance, EnumDefInstance,
    EnumLiteralDef, EnumerationSpec, LeafValue, SlotSpec, SourceLocation, TypeRef,
};
use sclschema_validator::{Diagnostic, InstanceDocument, SchemaRegistry, Severity};

/// Errors raised while loading schema or instance files.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File could not be parsed
    #[error("cannot parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A child or top-level entry references an unknown type id
    #[error("unknown type reference '{reference}'")]
    UnknownRef { reference: String },

    /// Two type definitions share an id
    #[error("type '{id}' is defined more than once")]
    DuplicateType { id: String },

    /// Type references form a cycle
    #[error("cyclic type reference through '{id}'")]
    CyclicRef { id: String },

    /// A child entry is neither a leaf nor a reference, or both
    #[error("child '{name}' of type '{id}' must have exactly one of 'leaf' or 'ref'")]
    AmbiguousChild { id: String, name: String },
}

// ---------------------------------------------------------------------------
// schema documents

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaFile {
    #[serde(default)]
    classes: Vec<RawClass>,
    #[serde(default)]
    enumerations: Vec<RawEnum>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClass {
    name: String,
    kind: ClassKind,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    slots: Vec<RawSlot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlot {
    name: String,
    presence: String,
    #[serde(default)]
    args: Option<String>,
    #[serde(default)]
    value: Option<RawTypeRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawTypeRef {
    Basic(String),
    Enum(String),
    Constructed(String),
    Nested(String),
}

impl From<RawTypeRef> for TypeRef {
    fn from(raw: RawTypeRef) -> Self {
        match raw {
            RawTypeRef::Basic(name) => TypeRef::Basic(name),
            RawTypeRef::Enum(name) => TypeRef::Enum(name),
            RawTypeRef::Constructed(name) => TypeRef::Constructed(name),
            RawTypeRef::Nested(name) => TypeRef::Nested(name),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnum {
    name: String,
    #[serde(default)]
    inherited_from: Option<String>,
    #[serde(default)]
    literals: IndexMap<String, i32>,
}

/// Load a schema file and build the registry. Schema-authoring defects come
/// back as build diagnostics, not errors.
pub fn load_schema(path: &Path) -> Result<(SchemaRegistry, Vec<Diagnostic>), LoaderError> {
    let file: SchemaFile = read_file(path)?;
    let mut builder = SchemaRegistry::builder();

    for raw_class in file.classes {
        let mut schema = ClassSchema::new(&raw_class.name, raw_class.kind);
        if let Some(parent) = raw_class.parent {
            schema = schema.with_parent(parent);
        }
        for raw_slot in raw_class.slots {
            let presence = builder.parse_condition(
                &raw_class.name,
                &raw_slot.name,
                &raw_slot.presence,
                raw_slot.args.as_deref(),
            );
            let slot = SlotSpec {
                name: raw_slot.name,
                presence,
                value: raw_slot.value.map(Into::into),
            };
            if let Err(err) = schema.add_slot(slot) {
                builder.report(Diagnostic {
                    severity: Severity::Warning,
                    code: "duplicate-slot-declaration".to_string(),
                    message: format!("{}; keeping the first declaration", err),
                    element: raw_class.name.clone(),
                    location: None,
                });
            }
        }
        builder.add_class(schema);
    }

    for raw_enum in file.enumerations {
        builder.add_enum(EnumerationSpec {
            name: raw_enum.name,
            literals: raw_enum.literals,
            inherited_from: raw_enum.inherited_from,
        });
    }

    let (registry, diagnostics) = builder.build();
    debug!(
        path = %path.display(),
        classes = registry.class_count(),
        enums = registry.enum_count(),
        "schema loaded"
    );
    Ok((registry, diagnostics))
}

// ---------------------------------------------------------------------------
// instance documents

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentFile {
    #[serde(default)]
    types: Vec<RawType>,
    #[serde(default)]
    containers: Vec<RawTopLevel>,
    #[serde(default)]
    enum_types: Vec<RawEnumType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawType {
    id: String,
    class: String,
    #[serde(default)]
    children: Vec<RawChild>,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChild {
    name: String,
    #[serde(default)]
    instance_number: Option<u32>,
    #[serde(default)]
    leaf: Option<RawLeaf>,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLeaf {
    btype: String,
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTopLevel {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    node_class: Option<String>,
    #[serde(default)]
    root_device: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnumType {
    id: String,
    #[serde(rename = "enum")]
    enum_name: String,
    #[serde(default)]
    values: Vec<RawEnumVal>,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnumVal {
    literal: String,
    ord: i32,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

/// Load an instance document. Type definitions referenced from several
/// places resolve to the same shared allocation.
pub fn load_document(path: &Path) -> Result<InstanceDocument, LoaderError> {
    let file: DocumentFile = read_file(path)?;

    let mut raw_types: HashMap<&str, &RawType> = HashMap::new();
    for raw in &file.types {
        if raw_types.insert(raw.id.as_str(), raw).is_some() {
            return Err(LoaderError::DuplicateType {
                id: raw.id.clone(),
            });
        }
    }

    let mut resolver = TypeResolver {
        raw_types,
        resolved: HashMap::new(),
        in_progress: Vec::new(),
    };

    let mut document = InstanceDocument::new();
    for top in &file.containers {
        let instance = resolver.resolve(&top.reference)?;
        let ambient = AmbientFacts {
            node_class: top.node_class.clone(),
            root_device: top.root_device,
        };
        document.add_container(instance, ambient);
    }

    for raw in &file.enum_types {
        document.add_enum_def(EnumDefInstance {
            id: raw.id.clone(),
            enum_name: raw.enum_name.clone(),
            values: raw
                .values
                .iter()
                .map(|v| EnumLiteralDef {
                    literal: v.literal.clone(),
                    ord: v.ord,
                    location: SourceLocation::new(v.line, v.column),
                })
                .collect(),
            location: SourceLocation::new(raw.line, raw.column),
        });
    }

    debug!(
        path = %path.display(),
        containers = document.containers.len(),
        enum_defs = document.enum_defs.len(),
        "instance document loaded"
    );
    Ok(document)
}

struct TypeResolver<'a> {
    raw_types: HashMap<&'a str, &'a RawType>,
    resolved: HashMap<String, Rc<ContainerInstance>>,
    in_progress: Vec<String>,
}

impl TypeResolver<'_> {
    fn resolve(&mut self, id: &str) -> Result<Rc<ContainerInstance>, LoaderError> {
        if let Some(instance) = self.resolved.get(id) {
            return Ok(Rc::clone(instance));
        }
        if self.in_progress.iter().any(|p| p == id) {
            return Err(LoaderError::CyclicRef { id: id.to_string() });
        }
        let raw = *self
            .raw_types
            .get(id)
            .ok_or_else(|| LoaderError::UnknownRef {
                reference: id.to_string(),
            })?;

        self.in_progress.push(id.to_string());
        let mut children = Vec::with_capacity(raw.children.len());
        for child in &raw.children {
            let location = SourceLocation::new(child.line, child.column);
            let mut built = match (&child.leaf, &child.reference) {
                (Some(leaf), None) => ChildInstance::leaf(
                    &child.name,
                    LeafValue {
                        btype: leaf.btype.clone(),
                        type_name: leaf.type_name.clone(),
                        values: leaf.values.clone(),
                    },
                    location,
                ),
                (None, Some(reference)) => {
                    let nested = self.resolve(reference)?;
                    ChildInstance::nested(&child.name, nested, location)
                }
                _ => {
                    return Err(LoaderError::AmbiguousChild {
                        id: raw.id.clone(),
                        name: child.name.clone(),
                    })
                }
            };
            built.instance_number = child.instance_number;
            children.push(built);
        }
        self.in_progress.pop();

        let instance = ContainerInstance::shared(
            &raw.class,
            children,
            SourceLocation::new(raw.line, raw.column),
        );
        self.resolved.insert(id.to_string(), Rc::clone(&instance));
        Ok(instance)
    }
}

// ---------------------------------------------------------------------------

fn read_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoaderError> {
    let content = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).map_err(|err| LoaderError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|err| LoaderError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}
