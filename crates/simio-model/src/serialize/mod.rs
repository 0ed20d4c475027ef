//! Serialization protocol: full-graph write and two-phase read.
//!
//! Both directions walk the same schema table ([`layout`]) through the
//! same child visitor ([`children`]), so the set and order of groups the
//! writer produces is exactly what the reader expects.

pub mod layout;
mod read;
mod write;

pub use read::{read_project, read_project_with};
pub(crate) use write::entity_attributes;

use simio_core::EntityKind;

use crate::error::ModelError;
use crate::id::Entity;
use crate::project::Project;

/// A position in the entity tree: the project root or an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Node {
    Root,
    Entity(Entity),
}

impl Node {
    pub(crate) fn kind(self) -> EntityKind {
        match self {
            Self::Root => EntityKind::Project,
            Self::Entity(e) => e.kind(),
        }
    }
}

fn collect<I: Copy + Into<Entity>>(children: &crate::entity::Children<I>) -> Vec<Entity> {
    children.values().map(|&id| id.into()).collect()
}

/// Entities owned by `node` in its collection `group`, in insertion order.
pub(crate) fn children(
    project: &Project,
    node: Node,
    group: &str,
) -> Result<Vec<Entity>, ModelError> {
    use layout::*;
    let entities = match (node, group) {
        (Node::Root, PARAMETERS) => collect(&project.parameter_names),
        (Node::Root, CONFIGURATIONS) => collect(&project.configuration_names),
        (Node::Root, TENSOR_TYPES) => collect(&project.tensor_type_names),
        (Node::Root, MANIFOLDS) => collect(&project.manifold_names),
        (Node::Root, TANGENT_SPACES) => collect(&project.tangent_space_names),
        (Node::Root, FIELDS) => collect(&project.field_names),
        (Node::Root, COORDINATE_SYSTEMS) => collect(&project.coordinate_system_names),
        (Node::Entity(Entity::Parameter(id)), PARAMETER_VALUES) => {
            collect(&project.parameter(id)?.values)
        }
        (Node::Entity(Entity::TensorType(id)), TENSOR_COMPONENTS) => {
            collect(&project.tensor_type(id)?.components)
        }
        (Node::Entity(Entity::Manifold(id)), DISCRETIZATIONS) => {
            collect(&project.manifold(id)?.discretizations)
        }
        (Node::Entity(Entity::Manifold(id)), SUBDISCRETIZATIONS) => {
            collect(&project.manifold(id)?.subdiscretizations)
        }
        (Node::Entity(Entity::Discretization(id)), DISCRETIZATION_BLOCKS) => {
            collect(&project.discretization(id)?.blocks)
        }
        (Node::Entity(Entity::TangentSpace(id)), BASES) => {
            collect(&project.tangent_space(id)?.bases)
        }
        (Node::Entity(Entity::Basis(id)), BASIS_VECTORS) => collect(&project.basis(id)?.vectors),
        (Node::Entity(Entity::Field(id)), DISCRETE_FIELDS) => {
            collect(&project.field(id)?.discrete_fields)
        }
        (Node::Entity(Entity::DiscreteField(id)), DISCRETE_FIELD_BLOCKS) => {
            collect(&project.discrete_field(id)?.blocks)
        }
        (Node::Entity(Entity::DiscreteFieldBlock(id)), COMPONENTS) => {
            collect(&project.discrete_field_block(id)?.components)
        }
        (Node::Entity(Entity::CoordinateSystem(id)), COORDINATE_FIELDS) => {
            collect(&project.coordinate_system(id)?.fields)
        }
        _ => Vec::new(),
    };
    Ok(entities)
}
