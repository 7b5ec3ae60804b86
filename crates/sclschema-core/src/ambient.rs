//! Ambient document context for the context-dependent presence conditions.

/// Queries into the instance tree's surroundings that a handful of presence
/// conditions need: whether the validated container sits in the LLN0 of its
/// logical device, and whether that device is the document's root device.
///
/// The engine never walks parent links itself; the loader answers these for
/// each top-level container it hands in. A logical device counts as the root
/// device when its LLN0 carries no `GrRef` data object.
pub trait AmbientContext {
    /// Class name of the containing logical node (`"LLN0"` for the device's
    /// zero node), or `None` when unknown.
    fn containing_node_class(&self) -> Option<&str>;

    /// Whether the containing logical device is the document's root device.
    fn is_root_device(&self) -> bool;
}

/// The class name of a logical device's zero node.
pub const LLN0: &str = "LLN0";

/// Owned ambient facts for one top-level container, as derived by a loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientFacts {
    /// Class name of the containing logical node, when known.
    pub node_class: Option<String>,
    /// Whether the containing logical device is the root device.
    pub root_device: bool,
}

impl AmbientFacts {
    /// Facts for a container inside the given logical node class.
    pub fn in_node(node_class: impl Into<String>) -> Self {
        Self {
            node_class: Some(node_class.into()),
            root_device: false,
        }
    }

    /// Mark the containing logical device as the root device.
    pub fn with_root_device(mut self, root: bool) -> Self {
        self.root_device = root;
        self
    }
}

impl AmbientContext for AmbientFacts {
    fn containing_node_class(&self) -> Option<&str> {
        self.node_class.as_deref()
    }

    fn is_root_device(&self) -> bool {
        self.root_device
    }
}

/// An ambient context that answers every query with "unknown". Validating
/// with it downgrades the context-dependent conditions to warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAmbient;

impl AmbientContext for NoAmbient {
    fn containing_node_class(&self) -> Option<&str> {
        None
    }

    fn is_root_device(&self) -> bool {
        false
    }
}
