//! The project: root namespace, arena owner and serialization unit.

use simio_core::{EntityKind, ProjectId};
use simio_store::GroupPath;

use crate::arena::Arena;
use crate::entity::*;
use crate::error::ModelError;
use crate::id::*;
use crate::serialize::layout;

/// Root of an entity graph.
///
/// A project owns one arena per entity kind. Handles returned by the
/// factories index those arenas and carry this project's [`ProjectId`], so a
/// handle from another project is rejected with
/// [`ModelError::DanglingReference`].
///
/// Top-level collections (configurations, parameters, tensor types,
/// manifolds, tangent spaces, fields, coordinate systems) are name-keyed in
/// insertion order, as are all nested collections; that order is the
/// serialization order.
///
/// A project is not `Clone`: a copy would share the [`ProjectId`], and
/// handles issued by one copy would resolve to unrelated entities in the
/// other once they diverge. Write the project to a store and read it back
/// to get an independent graph.
///
/// ```compile_fail
/// let p = simio_model::Project::new("run");
/// let q = p.clone();
/// ```
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    name: String,

    pub(crate) configurations: Arena<ConfigurationId, Configuration>,
    pub(crate) parameters: Arena<ParameterId, Parameter>,
    pub(crate) parameter_values: Arena<ParameterValueId, ParameterValue>,
    pub(crate) tensor_types: Arena<TensorTypeId, TensorType>,
    pub(crate) tensor_components: Arena<TensorComponentId, TensorComponent>,
    pub(crate) manifolds: Arena<ManifoldId, Manifold>,
    pub(crate) tangent_spaces: Arena<TangentSpaceId, TangentSpace>,
    pub(crate) discretizations: Arena<DiscretizationId, Discretization>,
    pub(crate) blocks: Arena<DiscretizationBlockId, DiscretizationBlock>,
    pub(crate) subdiscretizations: Arena<SubDiscretizationId, SubDiscretization>,
    pub(crate) bases: Arena<BasisId, Basis>,
    pub(crate) basis_vectors: Arena<BasisVectorId, BasisVector>,
    pub(crate) coordinate_systems: Arena<CoordinateSystemId, CoordinateSystem>,
    pub(crate) coordinate_fields: Arena<CoordinateFieldId, CoordinateField>,
    pub(crate) fields: Arena<FieldId, Field>,
    pub(crate) discrete_fields: Arena<DiscreteFieldId, DiscreteField>,
    pub(crate) discrete_field_blocks: Arena<DiscreteFieldBlockId, DiscreteFieldBlock>,
    pub(crate) components: Arena<ComponentId, Component>,

    pub(crate) configuration_names: Children<ConfigurationId>,
    pub(crate) parameter_names: Children<ParameterId>,
    pub(crate) tensor_type_names: Children<TensorTypeId>,
    pub(crate) manifold_names: Children<ManifoldId>,
    pub(crate) tangent_space_names: Children<TangentSpaceId>,
    pub(crate) field_names: Children<FieldId>,
    pub(crate) coordinate_system_names: Children<CoordinateSystemId>,
}

impl Project {
    /// An empty project.
    ///
    /// The project name is stored as an attribute of the root group and is
    /// not constrained like entity names.
    pub fn new(name: impl Into<String>) -> Self {
        let id = ProjectId::next();
        Self {
            id,
            name: name.into(),
            configurations: Arena::new(id),
            parameters: Arena::new(id),
            parameter_values: Arena::new(id),
            tensor_types: Arena::new(id),
            tensor_components: Arena::new(id),
            manifolds: Arena::new(id),
            tangent_spaces: Arena::new(id),
            discretizations: Arena::new(id),
            blocks: Arena::new(id),
            subdiscretizations: Arena::new(id),
            bases: Arena::new(id),
            basis_vectors: Arena::new(id),
            coordinate_systems: Arena::new(id),
            coordinate_fields: Arena::new(id),
            fields: Arena::new(id),
            discrete_fields: Arena::new(id),
            discrete_field_blocks: Arena::new(id),
            components: Arena::new(id),
            configuration_names: Children::new(),
            parameter_names: Children::new(),
            tensor_type_names: Children::new(),
            manifold_names: Children::new(),
            tangent_space_names: Children::new(),
            field_names: Children::new(),
            coordinate_system_names: Children::new(),
        }
    }

    /// Process-unique identity of this project.
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of entities, excluding the project itself.
    pub fn entity_count(&self) -> usize {
        self.configurations.len()
            + self.parameters.len()
            + self.parameter_values.len()
            + self.tensor_types.len()
            + self.tensor_components.len()
            + self.manifolds.len()
            + self.tangent_spaces.len()
            + self.discretizations.len()
            + self.blocks.len()
            + self.subdiscretizations.len()
            + self.bases.len()
            + self.basis_vectors.len()
            + self.coordinate_systems.len()
            + self.coordinate_fields.len()
            + self.fields.len()
            + self.discrete_fields.len()
            + self.discrete_field_blocks.len()
            + self.components.len()
    }

    /// Name of any entity.
    pub fn entity_name(&self, entity: impl Into<Entity>) -> Result<&str, ModelError> {
        let name = match entity.into() {
            Entity::Configuration(id) => self.configuration(id)?.name(),
            Entity::Parameter(id) => self.parameter(id)?.name(),
            Entity::ParameterValue(id) => self.parameter_value(id)?.name(),
            Entity::TensorType(id) => self.tensor_type(id)?.name(),
            Entity::TensorComponent(id) => self.tensor_component(id)?.name(),
            Entity::Manifold(id) => self.manifold(id)?.name(),
            Entity::TangentSpace(id) => self.tangent_space(id)?.name(),
            Entity::Discretization(id) => self.discretization(id)?.name(),
            Entity::DiscretizationBlock(id) => self.discretization_block(id)?.name(),
            Entity::SubDiscretization(id) => self.subdiscretization(id)?.name(),
            Entity::Basis(id) => self.basis(id)?.name(),
            Entity::BasisVector(id) => self.basis_vector(id)?.name(),
            Entity::CoordinateSystem(id) => self.coordinate_system(id)?.name(),
            Entity::CoordinateField(id) => self.coordinate_field(id)?.name(),
            Entity::Field(id) => self.field(id)?.name(),
            Entity::DiscreteField(id) => self.discrete_field(id)?.name(),
            Entity::DiscreteFieldBlock(id) => self.discrete_field_block(id)?.name(),
            Entity::DiscreteFieldBlockComponent(id) => self.component(id)?.name(),
        };
        Ok(name)
    }

    /// Absolute group path of an entity in the on-disk layout.
    pub fn path_of(&self, entity: impl Into<Entity>) -> Result<GroupPath, ModelError> {
        let root = GroupPath::root();
        let path = match entity.into() {
            Entity::Configuration(id) => root
                .child(layout::CONFIGURATIONS)
                .child(self.configuration(id)?.name()),
            Entity::Parameter(id) => root
                .child(layout::PARAMETERS)
                .child(self.parameter(id)?.name()),
            Entity::ParameterValue(id) => {
                let v = self.parameter_value(id)?;
                self.path_of(v.parameter)?
                    .child(layout::PARAMETER_VALUES)
                    .child(v.name())
            }
            Entity::TensorType(id) => root
                .child(layout::TENSOR_TYPES)
                .child(self.tensor_type(id)?.name()),
            Entity::TensorComponent(id) => {
                let c = self.tensor_component(id)?;
                self.path_of(c.tensor_type)?
                    .child(layout::TENSOR_COMPONENTS)
                    .child(c.name())
            }
            Entity::Manifold(id) => root
                .child(layout::MANIFOLDS)
                .child(self.manifold(id)?.name()),
            Entity::TangentSpace(id) => root
                .child(layout::TANGENT_SPACES)
                .child(self.tangent_space(id)?.name()),
            Entity::Discretization(id) => {
                let d = self.discretization(id)?;
                self.path_of(d.manifold)?
                    .child(layout::DISCRETIZATIONS)
                    .child(d.name())
            }
            Entity::DiscretizationBlock(id) => {
                let b = self.discretization_block(id)?;
                self.path_of(b.discretization)?
                    .child(layout::DISCRETIZATION_BLOCKS)
                    .child(b.name())
            }
            Entity::SubDiscretization(id) => {
                let s = self.subdiscretization(id)?;
                self.path_of(s.manifold)?
                    .child(layout::SUBDISCRETIZATIONS)
                    .child(s.name())
            }
            Entity::Basis(id) => {
                let b = self.basis(id)?;
                self.path_of(b.tangent_space)?
                    .child(layout::BASES)
                    .child(b.name())
            }
            Entity::BasisVector(id) => {
                let v = self.basis_vector(id)?;
                self.path_of(v.basis)?
                    .child(layout::BASIS_VECTORS)
                    .child(v.name())
            }
            Entity::CoordinateSystem(id) => root
                .child(layout::COORDINATE_SYSTEMS)
                .child(self.coordinate_system(id)?.name()),
            Entity::CoordinateField(id) => {
                let c = self.coordinate_field(id)?;
                self.path_of(c.coordinate_system)?
                    .child(layout::COORDINATE_FIELDS)
                    .child(c.name())
            }
            Entity::Field(id) => root
                .child(layout::FIELDS)
                .child(self.field(id)?.name()),
            Entity::DiscreteField(id) => {
                let d = self.discrete_field(id)?;
                self.path_of(d.field)?
                    .child(layout::DISCRETE_FIELDS)
                    .child(d.name())
            }
            Entity::DiscreteFieldBlock(id) => {
                let b = self.discrete_field_block(id)?;
                self.path_of(b.discrete_field)?
                    .child(layout::DISCRETE_FIELD_BLOCKS)
                    .child(b.name())
            }
            Entity::DiscreteFieldBlockComponent(id) => {
                let c = self.component(id)?;
                self.path_of(c.discrete_field_block)?
                    .child(layout::COMPONENTS)
                    .child(c.name())
            }
        };
        Ok(path)
    }
}

// ── Handle accessors ────────────────────────────────────────────

macro_rules! accessors {
    ($($get:ident: $id:ty => $ty:ty, $arena:ident;)*) => {
        impl Project {
            $(
                #[doc = concat!("The [`", stringify!($ty), "`] behind `id`.")]
                pub fn $get(&self, id: $id) -> Result<&$ty, ModelError> {
                    self.$arena.get(id)
                }
            )*
        }
    };
}

accessors! {
    configuration: ConfigurationId => Configuration, configurations;
    parameter: ParameterId => Parameter, parameters;
    parameter_value: ParameterValueId => ParameterValue, parameter_values;
    tensor_type: TensorTypeId => TensorType, tensor_types;
    tensor_component: TensorComponentId => TensorComponent, tensor_components;
    manifold: ManifoldId => Manifold, manifolds;
    tangent_space: TangentSpaceId => TangentSpace, tangent_spaces;
    discretization: DiscretizationId => Discretization, discretizations;
    discretization_block: DiscretizationBlockId => DiscretizationBlock, blocks;
    subdiscretization: SubDiscretizationId => SubDiscretization, subdiscretizations;
    basis: BasisId => Basis, bases;
    basis_vector: BasisVectorId => BasisVector, basis_vectors;
    coordinate_system: CoordinateSystemId => CoordinateSystem, coordinate_systems;
    coordinate_field: CoordinateFieldId => CoordinateField, coordinate_fields;
    field: FieldId => Field, fields;
    discrete_field: DiscreteFieldId => DiscreteField, discrete_fields;
    discrete_field_block: DiscreteFieldBlockId => DiscreteFieldBlock, discrete_field_blocks;
    component: ComponentId => Component, components;
}

// ── Reverse references ──────────────────────────────────────────

impl Project {
    /// Fields defined over `manifold`, in creation order.
    pub fn fields_on(&self, manifold: ManifoldId) -> Result<&[FieldId], ModelError> {
        Ok(&self.manifolds.get(manifold)?.fields)
    }

    /// Coordinate systems of `manifold`, in creation order.
    pub fn coordinate_systems_on(
        &self,
        manifold: ManifoldId,
    ) -> Result<&[CoordinateSystemId], ModelError> {
        Ok(&self.manifolds.get(manifold)?.coordinate_systems)
    }

    /// Discrete field blocks restricted to `block`, in creation order.
    pub fn discrete_field_blocks_on(
        &self,
        block: DiscretizationBlockId,
    ) -> Result<&[DiscreteFieldBlockId], ModelError> {
        Ok(&self.blocks.get(block)?.discrete_field_blocks)
    }

    /// Entities created in `configuration`, in creation order.
    ///
    /// Covers manifolds, discretizations, tangent spaces, bases, fields,
    /// discrete fields and coordinate systems.
    pub fn entities_in(&self, configuration: ConfigurationId) -> Result<&[Entity], ModelError> {
        Ok(&self.configurations.get(configuration)?.members)
    }
}

// ── Top-level collections ───────────────────────────────────────

macro_rules! top_level {
    ($($find:ident, $iter:ident: $id:ty, $names:ident, $what:literal;)*) => {
        impl Project {
            $(
                #[doc = concat!("Look up a ", $what, " by name.")]
                pub fn $find(&self, name: &str) -> Option<$id> {
                    self.$names.get(name).copied()
                }

                #[doc = concat!("All ", $what, "s in creation order.")]
                pub fn $iter(&self) -> impl Iterator<Item = (&str, $id)> + '_ {
                    self.$names.iter().map(|(k, &v)| (k.as_str(), v))
                }
            )*
        }
    };
}

top_level! {
    find_configuration, configurations: ConfigurationId, configuration_names, "configuration";
    find_parameter, parameters: ParameterId, parameter_names, "parameter";
    find_tensor_type, tensor_types: TensorTypeId, tensor_type_names, "tensor type";
    find_manifold, manifolds: ManifoldId, manifold_names, "manifold";
    find_tangent_space, tangent_spaces: TangentSpaceId, tangent_space_names, "tangent space";
    find_field, fields: FieldId, field_names, "field";
    find_coordinate_system, coordinate_systems: CoordinateSystemId, coordinate_system_names, "coordinate system";
}

// ── Validation helpers ──────────────────────────────────────────

/// Reject names that cannot be a group path component.
pub(crate) fn check_name(name: &str) -> Result<(), ModelError> {
    if GroupPath::is_valid_component(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Reject a name that is invalid or already taken in `children`.
pub(crate) fn check_new_name<I>(
    children: &Children<I>,
    kind: EntityKind,
    name: &str,
) -> Result<(), ModelError> {
    check_name(name)?;
    if children.contains_key(name) {
        return Err(ModelError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Reject a vector whose length is not the required dimension.
pub(crate) fn check_dimension(
    context: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            context,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_is_empty() {
        let p = Project::new("empty");
        assert_eq!(p.name(), "empty");
        assert_eq!(p.entity_count(), 0);
        assert!(p.find_manifold("domain").is_none());
        assert_eq!(p.manifolds().count(), 0);
    }

    #[test]
    fn projects_have_distinct_ids() {
        assert_ne!(Project::new("a").id(), Project::new("a").id());
    }

    #[test]
    fn name_rules() {
        assert!(check_name("rho").is_ok());
        for bad in ["", ".", "..", "a/b"] {
            match check_name(bad) {
                Err(ModelError::InvalidName { name }) => assert_eq!(name, bad),
                other => panic!("expected InvalidName, got {other:?}"),
            }
        }
    }
}
