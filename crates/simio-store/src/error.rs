//! Error types for storage operations.

use std::fmt;
use std::io;

use crate::datatype::Datatype;

/// Errors raised by a storage backend.
///
/// The entity graph propagates these opaquely; it never inspects them
/// beyond reporting.
#[derive(Debug)]
pub enum StoreError {
    /// An I/O error occurred while reading or writing a store file.
    Io(io::Error),
    /// The file does not start with the expected `b"SIMS"` magic bytes.
    InvalidMagic,
    /// The container version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The file could not be decoded (truncated or corrupt data).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A path or group name is syntactically invalid.
    InvalidPath {
        /// The offending path or name.
        path: String,
    },
    /// No group exists at the given path.
    NoSuchGroup {
        /// Absolute path of the missing group.
        path: String,
    },
    /// The group has no attribute of the given name.
    NoSuchAttribute {
        /// Absolute path of the group.
        path: String,
        /// Attribute name.
        name: String,
    },
    /// The group has no dataset of the given name.
    NoSuchDataset {
        /// Absolute path of the group.
        path: String,
        /// Dataset name.
        name: String,
    },
    /// A dataset of that name exists with a different datatype or shape.
    DatasetExists {
        /// Absolute path of the group.
        path: String,
        /// Dataset name.
        name: String,
    },
    /// A dataset transfer used a buffer of the wrong element type.
    TypeMismatch {
        /// Datatype declared by the dataset.
        expected: Datatype,
        /// Datatype of the supplied buffer.
        found: Datatype,
    },
    /// A dataset transfer used a buffer of the wrong length.
    LengthMismatch {
        /// Element count declared by the dataset shape.
        expected: usize,
        /// Element count of the supplied buffer.
        found: usize,
    },
    /// A dataset shape cannot be represented in memory.
    DatasetTooLarge {
        /// The requested shape.
        shape: Vec<u64>,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"SIMS\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported container version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed store: {detail}"),
            Self::InvalidPath { path } => write!(f, "invalid group path '{path}'"),
            Self::NoSuchGroup { path } => write!(f, "no group at '{path}'"),
            Self::NoSuchAttribute { path, name } => {
                write!(f, "group '{path}' has no attribute '{name}'")
            }
            Self::NoSuchDataset { path, name } => {
                write!(f, "group '{path}' has no dataset '{name}'")
            }
            Self::DatasetExists { path, name } => write!(
                f,
                "dataset '{name}' in '{path}' already exists with a different layout"
            ),
            Self::TypeMismatch { expected, found } => {
                write!(f, "datatype mismatch: dataset is {expected}, buffer is {found}")
            }
            Self::LengthMismatch { expected, found } => write!(
                f,
                "length mismatch: dataset holds {expected} elements, buffer has {found}"
            ),
            Self::DatasetTooLarge { shape } => {
                write!(f, "dataset shape {shape:?} exceeds addressable memory")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
