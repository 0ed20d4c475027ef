//! Error types for graph construction, data transfer and serialization.

use std::error::Error;
use std::fmt;

use simio_core::{EntityKind, ShapeError};
use simio_store::{Datatype, StoreError};

// ── ModelError ──────────────────────────────────────────────────

/// Errors from building or mutating a project graph.
///
/// Every factory validates before it mutates, so a returned error means the
/// graph is exactly as it was before the call.
#[derive(Debug)]
pub enum ModelError {
    /// An entity of that name already exists in the target collection.
    DuplicateName {
        /// Kind of the collection's entities.
        kind: EntityKind,
        /// The conflicting name.
        name: String,
    },
    /// A handle does not address an entity of this project.
    DanglingReference {
        /// Kind the handle claims to address.
        kind: EntityKind,
        /// Display form of the handle.
        handle: String,
    },
    /// Two referenced entities exist but are not related as required.
    ReferenceMismatch {
        /// Which relationship failed.
        detail: String,
    },
    /// A vector length or dimension disagrees with the owning manifold or
    /// tangent space.
    DimensionMismatch {
        /// What was being checked.
        context: &'static str,
        /// Required dimension.
        expected: usize,
        /// Supplied dimension.
        found: usize,
    },
    /// A component storage index or basis direction is out of range.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Exclusive upper bound.
        len: usize,
    },
    /// A component storage index or direction is already taken.
    DuplicateIndex {
        /// The repeated index.
        index: usize,
    },
    /// A name is empty, contains `/`, or is `.` or `..`.
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// A tensor shape or region was malformed.
    InvalidShape(ShapeError),
    /// An active-region box does not lie within its block.
    OutsideRegion {
        /// Name of the block.
        block: String,
    },
    /// The block's region cannot change because a component on it holds data.
    RegionLocked {
        /// Name of the block.
        block: String,
    },
    /// A data shape or buffer length disagrees with the block shape.
    ShapeMismatch {
        /// Shape required by the block.
        expected: Vec<u64>,
        /// Shape supplied by the caller (a flat buffer has shape `[len]`).
        found: Vec<u64>,
    },
    /// A buffer's element type disagrees with the component's declared type.
    DatatypeMismatch {
        /// Declared datatype.
        expected: Datatype,
        /// Supplied datatype.
        found: Datatype,
    },
    /// The component has no dataset attached.
    NoData {
        /// Name of the component.
        component: String,
    },
    /// The storage backend failed.
    Backend(StoreError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { kind, name } => {
                write!(f, "{kind} '{name}' already exists")
            }
            Self::DanglingReference { kind, handle } => {
                write!(f, "{kind} handle {handle} does not belong to this project")
            }
            Self::ReferenceMismatch { detail } => write!(f, "reference mismatch: {detail}"),
            Self::DimensionMismatch {
                context,
                expected,
                found,
            } => write!(f, "{context}: expected dimension {expected}, got {found}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range 0..{len}")
            }
            Self::DuplicateIndex { index } => write!(f, "index {index} is already in use"),
            Self::InvalidName { name } => write!(f, "invalid entity name '{name}'"),
            Self::InvalidShape(e) => write!(f, "{e}"),
            Self::OutsideRegion { block } => {
                write!(f, "active region extends outside block '{block}'")
            }
            Self::RegionLocked { block } => {
                write!(f, "block '{block}' has data attached; its region is fixed")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {expected:?}, got {found:?}")
            }
            Self::DatatypeMismatch { expected, found } => {
                write!(f, "datatype mismatch: expected {expected}, got {found}")
            }
            Self::NoData { component } => {
                write!(f, "component '{component}' has no dataset")
            }
            Self::Backend(e) => write!(f, "storage backend: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidShape(e) => Some(e),
            Self::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for ModelError {
    fn from(e: ShapeError) -> Self {
        Self::InvalidShape(e)
    }
}

impl From<StoreError> for ModelError {
    fn from(e: StoreError) -> Self {
        Self::Backend(e)
    }
}

// ── SerializeError ──────────────────────────────────────────────

/// Errors from writing a project to, or reading it from, a store.
///
/// A failed read never yields a partial project.
#[derive(Debug)]
pub enum SerializeError {
    /// A reference attribute holds a path that does not resolve to an entity
    /// of the expected kind.
    BrokenReference {
        /// Group holding the attribute.
        path: String,
        /// Attribute name.
        attribute: String,
        /// The unresolved target path.
        target: String,
    },
    /// A group's `type` attribute names a different kind than its location
    /// in the layout requires.
    UnexpectedType {
        /// Group path.
        path: String,
        /// Kind required by the layout.
        expected: EntityKind,
        /// Tag found in the file.
        found: String,
    },
    /// A required attribute is absent.
    MissingAttribute {
        /// Group path.
        path: String,
        /// Attribute name.
        name: String,
    },
    /// An attribute has the wrong type or an unusable value.
    InvalidAttribute {
        /// Group path.
        path: String,
        /// Attribute name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A group appears where the layout has no collection of that name.
    UnknownGroup {
        /// Group path.
        path: String,
    },
    /// The file was written by an incompatible format version.
    UnsupportedFormat {
        /// Version stamped on the root group.
        found: i64,
    },
    /// Stored tensor components disagree with the ordering derived from the
    /// tensor type's dimension, rank and symmetries.
    InconsistentTensorType {
        /// Group path of the tensor type.
        path: String,
        /// Which component disagrees.
        reason: String,
    },
    /// Re-creating an entity violated a graph invariant.
    Model(ModelError),
    /// The storage backend failed.
    Backend(StoreError),
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenReference {
                path,
                attribute,
                target,
            } => write!(
                f,
                "broken reference: '{path}' attribute '{attribute}' points to '{target}'"
            ),
            Self::UnexpectedType {
                path,
                expected,
                found,
            } => write!(f, "group '{path}' has type '{found}', expected '{expected}'"),
            Self::MissingAttribute { path, name } => {
                write!(f, "group '{path}' is missing attribute '{name}'")
            }
            Self::InvalidAttribute { path, name, reason } => {
                write!(f, "group '{path}' attribute '{name}': {reason}")
            }
            Self::UnknownGroup { path } => write!(f, "unknown group '{path}'"),
            Self::UnsupportedFormat { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::InconsistentTensorType { path, reason } => {
                write!(f, "inconsistent tensor type '{path}': {reason}")
            }
            Self::Model(e) => write!(f, "{e}"),
            Self::Backend(e) => write!(f, "storage backend: {e}"),
        }
    }
}

impl Error for SerializeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::Backend(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for SerializeError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Backend(e) => Self::Backend(e),
            other => Self::Model(other),
        }
    }
}

impl From<StoreError> for SerializeError {
    fn from(e: StoreError) -> Self {
        Self::Backend(e)
    }
}
