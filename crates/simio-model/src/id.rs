//! Typed entity handles.
//!
//! A handle is a copyable `(project, index)` pair. The index addresses the
//! per-kind arena of the project that created it; the project id makes a
//! handle from one project unusable in every other project.

use std::fmt;

use simio_core::{EntityKind, ProjectId};

/// Behaviour shared by every typed handle.
pub trait EntityId: Copy + Eq + fmt::Debug + fmt::Display {
    /// Kind of entity this handle addresses.
    const KIND: EntityKind;

    /// Project that created the handle.
    fn project(self) -> ProjectId;

    /// Position in the owning project's arena for this kind.
    fn index(self) -> usize;

    #[doc(hidden)]
    fn from_parts(project: ProjectId, index: usize) -> Self;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            project: ProjectId,
            index: u32,
        }

        impl EntityId for $name {
            const KIND: EntityKind = EntityKind::$kind;

            fn project(self) -> ProjectId {
                self.project
            }

            fn index(self) -> usize {
                self.index as usize
            }

            fn from_parts(project: ProjectId, index: usize) -> Self {
                Self {
                    project,
                    index: index as u32,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}@{}", EntityKind::$kind, self.index, self.project)
            }
        }

        impl From<$name> for Entity {
            fn from(id: $name) -> Self {
                Entity::$kind(id)
            }
        }
    };
}

entity_id!(
    /// Handle to a [`Configuration`](crate::Configuration).
    ConfigurationId => Configuration
);
entity_id!(
    /// Handle to a [`Parameter`](crate::Parameter).
    ParameterId => Parameter
);
entity_id!(
    /// Handle to a [`ParameterValue`](crate::ParameterValue).
    ParameterValueId => ParameterValue
);
entity_id!(
    /// Handle to a [`TensorType`](crate::TensorType).
    TensorTypeId => TensorType
);
entity_id!(
    /// Handle to a [`TensorComponent`](crate::TensorComponent).
    TensorComponentId => TensorComponent
);
entity_id!(
    /// Handle to a [`Manifold`](crate::Manifold).
    ManifoldId => Manifold
);
entity_id!(
    /// Handle to a [`TangentSpace`](crate::TangentSpace).
    TangentSpaceId => TangentSpace
);
entity_id!(
    /// Handle to a [`Discretization`](crate::Discretization).
    DiscretizationId => Discretization
);
entity_id!(
    /// Handle to a [`DiscretizationBlock`](crate::DiscretizationBlock).
    DiscretizationBlockId => DiscretizationBlock
);
entity_id!(
    /// Handle to a [`SubDiscretization`](crate::SubDiscretization).
    SubDiscretizationId => SubDiscretization
);
entity_id!(
    /// Handle to a [`Basis`](crate::Basis).
    BasisId => Basis
);
entity_id!(
    /// Handle to a [`BasisVector`](crate::BasisVector).
    BasisVectorId => BasisVector
);
entity_id!(
    /// Handle to a [`CoordinateSystem`](crate::CoordinateSystem).
    CoordinateSystemId => CoordinateSystem
);
entity_id!(
    /// Handle to a [`CoordinateField`](crate::CoordinateField).
    CoordinateFieldId => CoordinateField
);
entity_id!(
    /// Handle to a [`Field`](crate::Field).
    FieldId => Field
);
entity_id!(
    /// Handle to a [`DiscreteField`](crate::DiscreteField).
    DiscreteFieldId => DiscreteField
);
entity_id!(
    /// Handle to a [`DiscreteFieldBlock`](crate::DiscreteFieldBlock).
    DiscreteFieldBlockId => DiscreteFieldBlock
);
entity_id!(
    /// Handle to a [`Component`](crate::Component).
    ComponentId => DiscreteFieldBlockComponent
);

/// Any entity handle, tagged by kind.
///
/// This is the closed variant set walked by the serialization protocol.
/// The project itself has no handle; it is the root of every path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Entity {
    Configuration(ConfigurationId),
    Parameter(ParameterId),
    ParameterValue(ParameterValueId),
    TensorType(TensorTypeId),
    TensorComponent(TensorComponentId),
    Manifold(ManifoldId),
    TangentSpace(TangentSpaceId),
    Discretization(DiscretizationId),
    DiscretizationBlock(DiscretizationBlockId),
    SubDiscretization(SubDiscretizationId),
    Basis(BasisId),
    BasisVector(BasisVectorId),
    CoordinateSystem(CoordinateSystemId),
    CoordinateField(CoordinateFieldId),
    Field(FieldId),
    DiscreteField(DiscreteFieldId),
    DiscreteFieldBlock(DiscreteFieldBlockId),
    DiscreteFieldBlockComponent(ComponentId),
}

impl Entity {
    /// Kind tag of the referenced entity.
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Configuration(_) => EntityKind::Configuration,
            Self::Parameter(_) => EntityKind::Parameter,
            Self::ParameterValue(_) => EntityKind::ParameterValue,
            Self::TensorType(_) => EntityKind::TensorType,
            Self::TensorComponent(_) => EntityKind::TensorComponent,
            Self::Manifold(_) => EntityKind::Manifold,
            Self::TangentSpace(_) => EntityKind::TangentSpace,
            Self::Discretization(_) => EntityKind::Discretization,
            Self::DiscretizationBlock(_) => EntityKind::DiscretizationBlock,
            Self::SubDiscretization(_) => EntityKind::SubDiscretization,
            Self::Basis(_) => EntityKind::Basis,
            Self::BasisVector(_) => EntityKind::BasisVector,
            Self::CoordinateSystem(_) => EntityKind::CoordinateSystem,
            Self::CoordinateField(_) => EntityKind::CoordinateField,
            Self::Field(_) => EntityKind::Field,
            Self::DiscreteField(_) => EntityKind::DiscreteField,
            Self::DiscreteFieldBlock(_) => EntityKind::DiscreteFieldBlock,
            Self::DiscreteFieldBlockComponent(_) => EntityKind::DiscreteFieldBlockComponent,
        }
    }
}

/// Extract a typed handle from an [`Entity`] of the matching kind.
pub(crate) trait FromEntity: Sized {
    fn from_entity(entity: Entity) -> Option<Self>;
}

macro_rules! from_entity {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            impl FromEntity for $name {
                fn from_entity(entity: Entity) -> Option<Self> {
                    match entity {
                        Entity::$kind(id) => Some(id),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_entity!(
    ConfigurationId => Configuration,
    ParameterId => Parameter,
    ParameterValueId => ParameterValue,
    TensorTypeId => TensorType,
    TensorComponentId => TensorComponent,
    ManifoldId => Manifold,
    TangentSpaceId => TangentSpace,
    DiscretizationId => Discretization,
    DiscretizationBlockId => DiscretizationBlock,
    SubDiscretizationId => SubDiscretization,
    BasisId => Basis,
    BasisVectorId => BasisVector,
    CoordinateSystemId => CoordinateSystem,
    CoordinateFieldId => CoordinateField,
    FieldId => Field,
    DiscreteFieldId => DiscreteField,
    DiscreteFieldBlockId => DiscreteFieldBlock,
    ComponentId => DiscreteFieldBlockComponent,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_carry_kind_and_project() {
        let p = ProjectId::next();
        let m = ManifoldId::from_parts(p, 3);
        assert_eq!(m.project(), p);
        assert_eq!(m.index(), 3);
        assert_eq!(Entity::from(m).kind(), EntityKind::Manifold);
        assert_eq!(ManifoldId::from_entity(m.into()), Some(m));
        assert_eq!(FieldId::from_entity(m.into()), None);
    }

    #[test]
    fn display_names_kind_index_and_project() {
        let p = ProjectId::next();
        let c = ComponentId::from_parts(p, 0);
        assert_eq!(c.to_string(), format!("DiscreteFieldBlockComponent#0@{p}"));
    }
}
