//! simio: a self-describing container for simulation output.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the simio sub-crates. Adding `simio` as a single dependency is enough
//! for most users.
//!
//! # Quick start
//!
//! ```rust
//! use simio::prelude::*;
//!
//! let mut project = Project::new("heat");
//! let cfg = project.create_configuration("global").unwrap();
//! project.create_standard_tensor_types().unwrap();
//! let scalar = project.find_tensor_type("Scalar2D").unwrap();
//!
//! let plate = project.create_manifold("plate", cfg, 2).unwrap();
//! let grid = project.create_discretization(plate, "grid", cfg).unwrap();
//! let block = project
//!     .create_discretization_block(grid, "b0", &[0, 0], &[8, 8])
//!     .unwrap();
//! let space = project.create_tangent_space("tplate", cfg, 2).unwrap();
//! let basis = project.create_basis(space, "xy", cfg).unwrap();
//! project.create_basis_vector(basis, "x", 0).unwrap();
//! project.create_basis_vector(basis, "y", 1).unwrap();
//!
//! let temperature = project
//!     .create_field("temperature", cfg, plate, space, scalar)
//!     .unwrap();
//! let df = project
//!     .create_discrete_field(temperature, "temperature", cfg, grid, basis)
//!     .unwrap();
//! let dfb = project.create_discrete_field_block(df, "temperature-b0", block).unwrap();
//! let component = project.create_all_components(dfb).unwrap()[0];
//! project.set_data(component, Datatype::F32, &[8, 8]).unwrap();
//!
//! let mut store = MemStore::new();
//! project.write(&mut store).unwrap();
//! project
//!     .write_data(&mut store, component, (&vec![20.0_f32; 64]).into())
//!     .unwrap();
//!
//! let reopened = read_project(&store).unwrap();
//! assert_eq!(reopened.to_string(), project.to_string());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `simio-core` | Entity kinds, tensor shapes, index boxes |
//! | [`store`] | `simio-store` | Storage trait, in-memory and file backends, binary codec |
//! | [`model`] | `simio-model` | Project graph, factories, serialization protocol |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Entity kinds, tensor shapes and region arithmetic (`simio-core`).
pub use simio_core as types;

/// Hierarchical storage backends (`simio-store`).
///
/// The [`store::Storage`] trait is the only contract the graph relies on;
/// [`store::MemStore`] and [`store::FileStore`] implement it.
pub use simio_store as store;

/// Project graph and serialization protocol (`simio-model`).
pub use simio_model as model;

/// Common imports for typical simio usage.
///
/// ```rust
/// use simio::prelude::*;
/// ```
pub mod prelude {
    // Core vocabulary
    pub use simio_core::{EntityKind, IndexBox, IndexSymmetry, StorageOrder, TensorShape};

    // Storage
    pub use simio_store::{DataBuffer, DataSlice, Datatype, FileStore, MemStore, Storage};

    // Graph
    pub use simio_model::{
        read_project, read_project_with, ComponentData, ComponentId, Entity, EntityId, Project,
        ReadConfig, Value, WriteConfig,
    };

    // Errors
    pub use simio_core::ShapeError;
    pub use simio_model::{ModelError, SerializeError};
    pub use simio_store::StoreError;
}
