//! Core types for the simio container format.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by the storage backend and the entity graph: entity
//! kind tags, project identity, tensor shapes with their canonical component
//! ordering, and integer-box region arithmetic.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod kind;
pub mod region;
pub mod tensor;

pub use error::ShapeError;
pub use id::{IndexVec, ProjectId};
pub use kind::EntityKind;
pub use region::{IndexBox, StorageOrder};
pub use tensor::{IndexSymmetry, TensorShape};
