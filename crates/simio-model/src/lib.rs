//! Entity graph and serialization protocol for simio projects.
//!
//! A [`Project`] owns every entity of a simulation output: configurations
//! and parameters, tensor types, manifolds with their discretizations and
//! blocks, tangent spaces with their bases, fields, their discretized
//! instances and per-block components holding the data, and coordinate
//! systems. Entities are created only through the project's factory
//! methods and are addressed by copyable typed handles.
//!
//! [`Project::write`] stores the whole graph in any
//! [`Storage`](simio_store::Storage) backend; [`read_project`] re-creates
//! an isomorphic graph from it. Bulk values move separately through
//! [`Project::write_data`] and [`Project::read_data`].
//!
//! # Example
//!
//! ```
//! use simio_core::TensorShape;
//! use simio_model::{read_project, Project};
//! use simio_store::{Datatype, MemStore};
//!
//! let mut p = Project::new("demo");
//! let cfg = p.create_configuration("global").unwrap();
//! let scalar = p.create_tensor_type("Scalar1D", TensorShape::scalar(1).unwrap()).unwrap();
//! let line = p.create_manifold("line", cfg, 1).unwrap();
//! let grid = p.create_discretization(line, "grid", cfg).unwrap();
//! let block = p.create_discretization_block(grid, "b0", &[0], &[4]).unwrap();
//! let ts = p.create_tangent_space("tline", cfg, 1).unwrap();
//! let basis = p.create_basis(ts, "x", cfg).unwrap();
//! p.create_basis_vector(basis, "x", 0).unwrap();
//! let rho = p.create_field("rho", cfg, line, ts, scalar).unwrap();
//! let df = p.create_discrete_field(rho, "rho", cfg, grid, basis).unwrap();
//! let dfb = p.create_discrete_field_block(df, "rho-b0", block).unwrap();
//! let c = p.create_component(dfb, "scalar", 0).unwrap();
//! p.set_data(c, Datatype::F64, &[4]).unwrap();
//!
//! let mut store = MemStore::new();
//! p.write(&mut store).unwrap();
//! p.write_data(&mut store, c, (&[1.0, 2.0, 3.0, 4.0][..]).into()).unwrap();
//!
//! let q = read_project(&store).unwrap();
//! assert_eq!(p.to_string(), q.to_string());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod arena;
pub mod build;
pub mod config;
pub mod data;
pub mod entity;
pub mod error;
pub mod id;
mod output;
pub mod project;
pub mod serialize;

pub use build::STANDARD_DIMENSIONS;
pub use config::{ReadConfig, WriteConfig};
pub use entity::{
    Basis, BasisVector, Children, Component, ComponentData, Configuration, CoordinateField,
    CoordinateSystem, DiscreteField, DiscreteFieldBlock, Discretization, DiscretizationBlock,
    Field, Manifold, Parameter, ParameterValue, SubDiscretization, TangentSpace, TensorComponent,
    TensorType, Value,
};
pub use error::{ModelError, SerializeError};
pub use id::{
    BasisId, BasisVectorId, ComponentId, ConfigurationId, CoordinateFieldId, CoordinateSystemId,
    DiscreteFieldBlockId, DiscreteFieldId, DiscretizationBlockId, DiscretizationId, Entity,
    EntityId, FieldId, ManifoldId, ParameterId, ParameterValueId, SubDiscretizationId,
    TangentSpaceId, TensorComponentId, TensorTypeId,
};
pub use project::Project;
pub use serialize::layout::LAYOUT_VERSION as FORMAT_VERSION;
pub use serialize::{read_project, read_project_with};
