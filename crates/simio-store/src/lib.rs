//! Hierarchical storage backend for simio projects.
//!
//! The entity graph never talks to a file format directly. It consumes the
//! narrow [`Storage`] contract: create-or-open a named group, set/get
//! attributes on it, create a typed fixed-shape dataset, and transfer a
//! dataset's full contents as a flat buffer.
//!
//! # Backends
//!
//! - [`MemStore`]: in-memory tree of groups, the reference implementation
//! - [`FileStore`]: a [`MemStore`] persisted to a single binary file
//!
//! # File format
//!
//! ```text
//! [MAGIC "SIMS"] [VERSION u8] [root group]
//! group := [attr count u32] [attrs...] [dataset count u32] [datasets...]
//!          [child count u32] ([name] [group])...
//! ```
//!
//! All integers are little-endian; strings are `u32`-length-prefixed UTF-8.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod codec;
pub mod datatype;
pub mod error;
pub mod file;
pub mod memory;
pub mod path;

pub use backend::Storage;
pub use datatype::{element_count, AttrValue, DataBuffer, DataSlice, DatasetInfo, Datatype};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemStore;
pub use path::GroupPath;

/// Magic bytes at the start of every store file.
pub const MAGIC: [u8; 4] = *b"SIMS";

/// Current binary container version.
pub const FORMAT_VERSION: u8 = 1;
